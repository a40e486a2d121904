//! In-memory store for development and testing.
//!
//! History lives only as long as the process. For durable storage use the
//! SQLite backend.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::models::{Alert, AlertId, Fix, SystemEvent};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ports::{LocationStore, StoreStats};

#[derive(Debug, Default)]
struct Inner {
    fixes: Vec<Fix>,
    alerts: Vec<Alert>,
    events: Vec<SystemEvent>,
}

/// In-memory implementation of LocationStore
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, oldest first
    pub fn events(&self) -> Result<Vec<SystemEvent>> {
        Ok(self.read()?.events.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| GeotrackError::Storage("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| GeotrackError::Storage("memory store lock poisoned".into()))
    }
}

fn alert_index(id: AlertId) -> Option<usize> {
    usize::try_from(id.0).ok()?.checked_sub(1)
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn append(&self, fix: &Fix) -> Result<i64> {
        let mut inner = self.write()?;
        inner.fixes.push(fix.clone());
        Ok(inner.fixes.len() as i64)
    }

    async fn latest(&self) -> Result<Option<Fix>> {
        Ok(self.read()?.fixes.last().cloned())
    }

    async fn since(&self, since: DateTime<Utc>) -> Result<Vec<Fix>> {
        let inner = self.read()?;
        let mut fixes: Vec<Fix> =
            inner.fixes.iter().filter(|f| f.captured_at >= since).cloned().collect();
        // Stable sort keeps append order for equal timestamps
        fixes.sort_by_key(|f| f.captured_at);
        Ok(fixes)
    }

    async fn append_alert(&self, alert: &Alert) -> Result<AlertId> {
        let mut inner = self.write()?;
        let id = AlertId(inner.alerts.len() as i64 + 1);

        let mut stored = alert.clone();
        stored.id = Some(id);
        inner.alerts.push(stored);

        Ok(id)
    }

    async fn record_delivery(&self, id: AlertId, attempts: u32, success: bool) -> Result<()> {
        let mut inner = self.write()?;
        let alert = alert_index(id)
            .and_then(|idx| inner.alerts.get_mut(idx))
            .ok_or(GeotrackError::AlertNotFound { id: id.0 })?;

        alert.notification_attempts = attempts;
        alert.notification_success = success;
        Ok(())
    }

    async fn resolve(&self, id: AlertId) -> Result<bool> {
        let mut inner = self.write()?;
        let alert = alert_index(id)
            .and_then(|idx| inner.alerts.get_mut(idx))
            .ok_or(GeotrackError::AlertNotFound { id: id.0 })?;

        Ok(alert.resolve(Utc::now()))
    }

    async fn open_alerts(&self) -> Result<Vec<Alert>> {
        let inner = self.read()?;
        Ok(inner.alerts.iter().filter(|a| !a.resolved).cloned().collect())
    }

    async fn alerts(&self, limit: usize) -> Result<Vec<Alert>> {
        let inner = self.read()?;
        Ok(inner.alerts.iter().rev().take(limit).cloned().collect())
    }

    async fn record_event(&self, event: &SystemEvent) -> Result<()> {
        self.write()?.events.push(event.clone());
        Ok(())
    }

    async fn statistics(&self) -> Result<StoreStats> {
        let inner = self.read()?;
        let cutoff = Utc::now() - Duration::hours(24);

        Ok(StoreStats {
            total_fixes: inner.fixes.len() as u64,
            fixes_last_24h: inner.fixes.iter().filter(|f| f.captured_at >= cutoff).count() as u64,
            open_alerts: inner.alerts.iter().filter(|a| !a.resolved).count() as u64,
            last_update: inner.fixes.last().map(|f| f.captured_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotrack_core::models::AlertKind;

    fn fix_at(lat: f64, lon: f64, minutes_ago: i64) -> Fix {
        Fix::new(lat, lon, Utc::now() - Duration::minutes(minutes_ago)).unwrap()
    }

    #[tokio::test]
    async fn test_latest_returns_last_appended() {
        let store = MemoryStore::new();
        assert!(store.latest().await.unwrap().is_none());

        store.append(&fix_at(40.7128, -74.0060, 2)).await.unwrap();
        store.append(&fix_at(40.7130, -74.0061, 1)).await.unwrap();

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.latitude, 40.7130);
        assert_eq!(latest.longitude, -74.0061);
    }

    #[tokio::test]
    async fn test_since_is_ascending_and_filtered() {
        let store = MemoryStore::new();
        store.append(&fix_at(1.0, 1.0, 120)).await.unwrap();
        store.append(&fix_at(3.0, 3.0, 5)).await.unwrap();
        store.append(&fix_at(2.0, 2.0, 30)).await.unwrap();

        let fixes = store.since(Utc::now() - Duration::hours(1)).await.unwrap();
        let lats: Vec<f64> = fixes.iter().map(|f| f.latitude).collect();
        assert_eq!(lats, vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_alert_lifecycle() {
        let store = MemoryStore::new();
        let alert = Alert::new(AlertKind::PositionLost, "No GPS data", None);

        let first = store.append_alert(&alert).await.unwrap();
        let second = store.append_alert(&alert).await.unwrap();
        assert!(second > first);
        assert_eq!(store.open_alerts().await.unwrap().len(), 2);

        store.record_delivery(first, 2, true).await.unwrap();
        assert!(store.resolve(first).await.unwrap());
        assert!(!store.resolve(first).await.unwrap());

        let open = store.open_alerts().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, Some(second));

        let recent = store.alerts(10).await.unwrap();
        assert_eq!(recent[0].id, Some(second));
        assert_eq!(recent[1].notification_attempts, 2);
        assert!(recent[1].notification_success);
        assert!(recent[1].resolved_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_alert() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.resolve(AlertId(42)).await,
            Err(GeotrackError::AlertNotFound { id: 42 })
        ));
        assert!(store.resolve(AlertId(0)).await.is_err());
        assert!(store.record_delivery(AlertId(-1), 1, false).await.is_err());
    }

    #[tokio::test]
    async fn test_statistics() {
        let store = MemoryStore::new();
        store.append(&fix_at(1.0, 1.0, 60 * 48)).await.unwrap();
        store.append(&fix_at(2.0, 2.0, 10)).await.unwrap();
        store
            .append_alert(&Alert::new(AlertKind::PerimeterBreach, "outside", None))
            .await
            .unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total_fixes, 2);
        assert_eq!(stats.fixes_last_24h, 1);
        assert_eq!(stats.open_alerts, 1);
        assert!(stats.last_update.is_some());
    }
}
