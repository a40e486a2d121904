use chrono::{DateTime, Utc};
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::models::{Alert, AlertId, Fix, FixQuality};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::db_error;

pub(super) fn to_micros(t: DateTime<Utc>) -> i64 {
    t.timestamp_micros()
}

pub(super) fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| GeotrackError::Storage(format!("Timestamp out of range: {}", micros)))
}

pub(super) fn fix_from_row(row: &SqliteRow) -> Result<Fix> {
    let latitude: f64 = row.try_get("latitude").map_err(db_error("decode latitude"))?;
    let longitude: f64 = row.try_get("longitude").map_err(db_error("decode longitude"))?;
    let altitude: Option<f64> = row.try_get("altitude").map_err(db_error("decode altitude"))?;
    let speed: Option<f64> = row.try_get("speed").map_err(db_error("decode speed"))?;
    let satellites: Option<i64> = row.try_get("satellites").map_err(db_error("decode satellites"))?;
    let quality: Option<i64> = row.try_get("fix_quality").map_err(db_error("decode fix quality"))?;
    let captured_at: i64 = row.try_get("captured_at").map_err(db_error("decode captured_at"))?;

    let mut fix = Fix::new(latitude, longitude, from_micros(captured_at)?)?;
    fix.altitude = altitude;
    fix.speed = speed;
    fix.satellites = satellites.and_then(|s| u8::try_from(s).ok());
    fix.quality = quality.and_then(|q| u8::try_from(q).ok()).and_then(FixQuality::from_gga);

    Ok(fix)
}

pub(super) fn alert_from_row(row: &SqliteRow) -> Result<Alert> {
    let id: i64 = row.try_get("id").map_err(db_error("decode alert id"))?;
    let kind: String = row.try_get("kind").map_err(db_error("decode alert kind"))?;
    let message: String = row.try_get("message").map_err(db_error("decode alert message"))?;
    let latitude: Option<f64> = row.try_get("latitude").map_err(db_error("decode latitude"))?;
    let longitude: Option<f64> = row.try_get("longitude").map_err(db_error("decode longitude"))?;
    let created_at: i64 = row.try_get("created_at").map_err(db_error("decode created_at"))?;
    let resolved: i64 = row.try_get("resolved").map_err(db_error("decode resolved"))?;
    let resolved_at: Option<i64> =
        row.try_get("resolved_at").map_err(db_error("decode resolved_at"))?;
    let attempts: i64 = row
        .try_get("notification_attempts")
        .map_err(db_error("decode notification attempts"))?;
    let success: i64 = row
        .try_get("notification_success")
        .map_err(db_error("decode notification success"))?;

    Ok(Alert {
        id: Some(AlertId(id)),
        kind: kind.into(),
        message,
        latitude,
        longitude,
        created_at: from_micros(created_at)?,
        resolved: resolved != 0,
        resolved_at: resolved_at.map(from_micros).transpose()?,
        notification_attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
        notification_success: success != 0,
    })
}
