use chrono::{DateTime, Utc};
use geotrack_core::models::{Alert, Fix, GeofenceStatus};
use geotrack_store::StoreStats;
use serde::Serialize;
use tabled::Tabled;

/// Output for init command
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub config_path: String,
    pub overwritten: bool,
}

/// Output for run command once tracking has stopped
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub subject_id: String,
    pub source: String,
    pub cycles: u64,
    pub consecutive_failures: u32,
    pub statistics: StoreStats,
}

/// Output for status command
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub subject_id: String,
    pub database: String,
    pub latest: Option<Fix>,
    pub geofence: Option<GeofenceStatus>,
    pub statistics: StoreStats,
}

/// Output for resolve command
#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    pub id: i64,
    pub changed: bool,
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[derive(Debug, Serialize, Tabled)]
pub struct FixRow {
    #[tabled(rename = "Time")]
    pub captured_at: String,
    #[tabled(rename = "Latitude")]
    pub latitude: String,
    #[tabled(rename = "Longitude")]
    pub longitude: String,
    #[tabled(rename = "Altitude (m)")]
    pub altitude: String,
    #[tabled(rename = "Speed (knots)")]
    pub speed: String,
    #[tabled(rename = "Satellites")]
    pub satellites: String,
}

impl From<&Fix> for FixRow {
    fn from(fix: &Fix) -> Self {
        Self {
            captured_at: timestamp(fix.captured_at),
            latitude: format!("{:.6}", fix.latitude),
            longitude: format!("{:.6}", fix.longitude),
            altitude: optional(fix.altitude.map(|a| format!("{:.1}", a))),
            speed: optional(fix.speed.map(|s| format!("{:.1}", s))),
            satellites: optional(fix.satellites),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct AlertRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Raised")]
    pub created_at: String,
    #[tabled(rename = "Message")]
    pub message: String,
    #[tabled(rename = "Notified")]
    pub notified: String,
    #[tabled(rename = "Resolved")]
    pub resolved: String,
}

impl From<&Alert> for AlertRow {
    fn from(alert: &Alert) -> Self {
        let notified = format!(
            "{} ({} attempts)",
            if alert.notification_success { "yes" } else { "no" },
            alert.notification_attempts
        );
        Self {
            id: optional(alert.id),
            kind: alert.kind.to_string(),
            created_at: timestamp(alert.created_at),
            message: alert.message.clone(),
            notified,
            resolved: optional(alert.resolved_at.map(timestamp)),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
