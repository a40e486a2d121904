use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::models::{Alert, AlertId, Fix, SystemEvent};

use super::rows::{alert_from_row, fix_from_row, from_micros, to_micros};
use super::{db_error, SqliteStore};
use crate::ports::{LocationStore, StoreStats};

const LOCATION_COLUMNS: &str =
    "latitude, longitude, altitude, speed, satellites, fix_quality, captured_at";

const ALERT_COLUMNS: &str = "id, kind, message, latitude, longitude, created_at, resolved, \
     resolved_at, notification_attempts, notification_success";

#[async_trait]
impl LocationStore for SqliteStore {
    async fn append(&self, fix: &Fix) -> Result<i64> {
        let _guard = self.write_lock.lock().await;

        let result = sqlx::query(
            r#"
            INSERT INTO locations
                (subject_id, latitude, longitude, altitude, speed, satellites, fix_quality,
                 captured_at, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.subject_id)
        .bind(fix.latitude)
        .bind(fix.longitude)
        .bind(fix.altitude)
        .bind(fix.speed)
        .bind(fix.satellites.map(i64::from))
        .bind(fix.quality.map(|q| i64::from(q.code())))
        .bind(to_micros(fix.captured_at))
        .bind(to_micros(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(db_error("append location"))?;

        Ok(result.last_insert_rowid())
    }

    async fn latest(&self) -> Result<Option<Fix>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM locations WHERE subject_id = ? ORDER BY id DESC LIMIT 1",
            LOCATION_COLUMNS
        ))
        .bind(&self.subject_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch latest location"))?;

        row.as_ref().map(fix_from_row).transpose()
    }

    async fn since(&self, since: DateTime<Utc>) -> Result<Vec<Fix>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM locations WHERE subject_id = ? AND captured_at >= ? \
             ORDER BY captured_at ASC, id ASC",
            LOCATION_COLUMNS
        ))
        .bind(&self.subject_id)
        .bind(to_micros(since))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("query location history"))?;

        rows.iter().map(fix_from_row).collect()
    }

    async fn append_alert(&self, alert: &Alert) -> Result<AlertId> {
        let _guard = self.write_lock.lock().await;

        let result = sqlx::query(
            r#"
            INSERT INTO alerts
                (subject_id, kind, message, latitude, longitude, created_at, resolved,
                 resolved_at, notification_attempts, notification_success)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.subject_id)
        .bind(alert.kind.as_str())
        .bind(&alert.message)
        .bind(alert.latitude)
        .bind(alert.longitude)
        .bind(to_micros(alert.created_at))
        .bind(i64::from(alert.resolved))
        .bind(alert.resolved_at.map(to_micros))
        .bind(i64::from(alert.notification_attempts))
        .bind(i64::from(alert.notification_success))
        .execute(&self.pool)
        .await
        .map_err(db_error("append alert"))?;

        Ok(AlertId(result.last_insert_rowid()))
    }

    async fn record_delivery(&self, id: AlertId, attempts: u32, success: bool) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let result = sqlx::query(
            "UPDATE alerts SET notification_attempts = ?, notification_success = ? \
             WHERE id = ? AND subject_id = ?",
        )
        .bind(i64::from(attempts))
        .bind(i64::from(success))
        .bind(id.0)
        .bind(&self.subject_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("record notification delivery"))?;

        if result.rows_affected() == 0 {
            return Err(GeotrackError::AlertNotFound { id: id.0 });
        }

        Ok(())
    }

    async fn resolve(&self, id: AlertId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let result = sqlx::query(
            "UPDATE alerts SET resolved = 1, resolved_at = ? \
             WHERE id = ? AND subject_id = ? AND resolved = 0",
        )
        .bind(to_micros(Utc::now()))
        .bind(id.0)
        .bind(&self.subject_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("resolve alert"))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE id = ? AND subject_id = ?")
                .bind(id.0)
                .bind(&self.subject_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("look up alert"))?;

        if exists == 0 {
            return Err(GeotrackError::AlertNotFound { id: id.0 });
        }

        Ok(false)
    }

    async fn open_alerts(&self) -> Result<Vec<Alert>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM alerts WHERE subject_id = ? AND resolved = 0 ORDER BY id ASC",
            ALERT_COLUMNS
        ))
        .bind(&self.subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("query open alerts"))?;

        rows.iter().map(alert_from_row).collect()
    }

    async fn alerts(&self, limit: usize) -> Result<Vec<Alert>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM alerts WHERE subject_id = ? ORDER BY id DESC LIMIT ?",
            ALERT_COLUMNS
        ))
        .bind(&self.subject_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("query alerts"))?;

        rows.iter().map(alert_from_row).collect()
    }

    async fn record_event(&self, event: &SystemEvent) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        sqlx::query(
            "INSERT INTO system_events (subject_id, component, status, message, recorded_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&self.subject_id)
        .bind(&event.component)
        .bind(&event.status)
        .bind(&event.message)
        .bind(to_micros(event.recorded_at))
        .execute(&self.pool)
        .await
        .map_err(db_error("record system event"))?;

        Ok(())
    }

    async fn statistics(&self) -> Result<StoreStats> {
        let cutoff = to_micros(Utc::now() - Duration::hours(24));

        let (total, recent, last): (i64, i64, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(CASE WHEN captured_at >= ? THEN 1 ELSE 0 END), 0), \
                    MAX(captured_at) \
             FROM locations WHERE subject_id = ?",
        )
        .bind(cutoff)
        .bind(&self.subject_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("compute location statistics"))?;

        let open: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE subject_id = ? AND resolved = 0")
                .bind(&self.subject_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("count open alerts"))?;

        Ok(StoreStats {
            total_fixes: total.max(0) as u64,
            fixes_last_24h: recent.max(0) as u64,
            open_alerts: open.max(0) as u64,
            last_update: last.map(from_micros).transpose()?,
        })
    }
}
