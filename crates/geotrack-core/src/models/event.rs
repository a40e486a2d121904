use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An operational event recorded alongside the location history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemEvent {
    /// Component that emitted the event (e.g. "TRACKING", "SOURCE", "ALERT")
    pub component: String,

    /// Short status keyword (e.g. "STARTED", "FAILED")
    pub status: String,

    /// Free-form detail
    pub message: String,

    pub recorded_at: DateTime<Utc>,
}

impl SystemEvent {
    pub fn new(
        component: impl Into<String>,
        status: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            status: status.into(),
            message: message.into(),
            recorded_at: Utc::now(),
        }
    }
}
