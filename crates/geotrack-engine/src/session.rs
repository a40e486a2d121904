use geotrack_core::models::{Alert, AlertKind, Fix, GeofenceStatus};
use serde::Serialize;
use tokio::time::Instant;

/// Lifecycle of the tracking loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackerState {
    Stopped,
    Running,
    Stopping,
}

/// Per-run state owned by the tracking loop
#[derive(Debug, Default)]
pub struct TrackingSession {
    /// Most recent decoded fix
    pub last_fix: Option<Fix>,

    /// Monotonic time at which `last_fix` was decoded
    pub last_fix_at: Option<Instant>,

    /// Polls since the last fix that produced none
    pub consecutive_failures: u32,

    /// Completed poll cycles
    pub cycles: u64,

    /// Whether the last source read failed
    pub source_failing: bool,
}

impl TrackingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_fix(&mut self, fix: Fix) {
        self.last_fix = Some(fix);
        self.last_fix_at = Some(Instant::now());
        self.consecutive_failures = 0;
    }

    pub(crate) fn record_miss(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }
}

/// What happened during one poll cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    /// 1-based cycle number within the session
    pub cycle: u64,

    /// The decoded fix, if any
    pub fix: Option<Fix>,

    /// Geofence evaluation of `fix`
    pub geofence: Option<GeofenceStatus>,

    /// Whether `fix` was persisted
    pub stored: bool,

    /// Upload outcome for `fix`; `None` when no uploader is configured
    pub uploaded: Option<bool>,

    /// Failure streak after this cycle
    pub consecutive_failures: u32,

    /// Sentences seen but rejected by the decoder
    pub rejected_sentences: usize,

    /// Source failure, treated as an empty read
    pub source_error: Option<String>,

    /// Alerts raised during this cycle
    pub raised: Vec<Alert>,

    /// Conditions that cleared during this cycle
    pub cleared: Vec<AlertKind>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_fix_resets_streak() {
        let mut session = TrackingSession::new();
        assert_eq!(session.record_miss(), 1);
        assert_eq!(session.record_miss(), 2);

        session.record_fix(Fix::new(1.0, 2.0, Utc::now()).unwrap());
        assert_eq!(session.consecutive_failures, 0);
        assert!(session.last_fix_at.is_some());
        assert_eq!(session.record_miss(), 1);
        assert_eq!(session.last_fix.as_ref().map(|f| f.latitude), Some(1.0));
    }
}
