use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geotrack_core::error::Result;
use geotrack_core::models::{Alert, AlertId, Fix, SystemEvent};
use serde::{Deserialize, Serialize};

/// Aggregate counters over the stored history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_fixes: u64,
    pub fixes_last_24h: u64,
    pub open_alerts: u64,
    /// Capture time of the most recent fix
    pub last_update: Option<DateTime<Utc>>,
}

/// Port for the append-only location and alert history
///
/// Writes are durable when the call returns. Only the tracking loop writes;
/// any number of readers may query concurrently.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Append a fix and return its sequence number
    async fn append(&self, fix: &Fix) -> Result<i64>;

    /// The most recently appended fix
    async fn latest(&self) -> Result<Option<Fix>>;

    /// Fixes captured at or after `since`, ascending by capture time
    async fn since(&self, since: DateTime<Utc>) -> Result<Vec<Fix>>;

    /// Persist a new alert and return its identifier
    async fn append_alert(&self, alert: &Alert) -> Result<AlertId>;

    /// Record the outcome of a notification round for an alert
    async fn record_delivery(&self, id: AlertId, attempts: u32, success: bool) -> Result<()>;

    /// Mark an alert resolved
    ///
    /// Returns `false` if the alert was already resolved and
    /// `AlertNotFound` if no such alert exists.
    async fn resolve(&self, id: AlertId) -> Result<bool>;

    /// All unresolved alerts, oldest first
    async fn open_alerts(&self) -> Result<Vec<Alert>>;

    /// The most recent alerts, newest first
    async fn alerts(&self, limit: usize) -> Result<Vec<Alert>>;

    /// Persist an operational event
    async fn record_event(&self, event: &SystemEvent) -> Result<()>;

    /// Aggregate counters for status reporting
    async fn statistics(&self) -> Result<StoreStats>;
}
