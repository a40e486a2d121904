use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::fix::Fix;

/// Unique identifier for a persisted alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertId(pub i64);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of condition an alert reports
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AlertKind {
    /// Subject is outside the geofence
    PerimeterBreach,
    /// No fix has been decoded for too many consecutive polls
    PositionLost,
    /// Operationally defined kind, stored verbatim
    Other(String),
}

impl AlertKind {
    pub fn as_str(&self) -> &str {
        match self {
            AlertKind::PerimeterBreach => "PERIMETER_BREACH",
            AlertKind::PositionLost => "POSITION_LOST",
            AlertKind::Other(name) => name,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "PERIMETER_BREACH" => AlertKind::PerimeterBreach,
            "POSITION_LOST" => AlertKind::PositionLost,
            other => AlertKind::Other(other.to_string()),
        })
    }
}

impl From<String> for AlertKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<AlertKind> for String {
    fn from(kind: AlertKind) -> Self {
        kind.as_str().to_string()
    }
}

/// An alert record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Identifier assigned by the store; `None` until persisted
    pub id: Option<AlertId>,

    /// What triggered the alert
    pub kind: AlertKind,

    /// Human-readable description
    pub message: String,

    /// Latitude of the triggering fix, if any fix was known
    pub latitude: Option<f64>,

    /// Longitude of the triggering fix, if any fix was known
    pub longitude: Option<f64>,

    /// When the alert was raised
    pub created_at: DateTime<Utc>,

    /// Whether the alert has been resolved. Never reverts to `false`.
    pub resolved: bool,

    /// When the alert was resolved
    pub resolved_at: Option<DateTime<Utc>>,

    /// Number of notification sends attempted across all destinations
    pub notification_attempts: u32,

    /// Whether at least one destination accepted a notification
    pub notification_success: bool,
}

impl Alert {
    /// Create a new, unresolved and not yet notified alert
    pub fn new(kind: AlertKind, message: impl Into<String>, fix: Option<&Fix>) -> Self {
        Self {
            id: None,
            kind,
            message: message.into(),
            latitude: fix.map(|f| f.latitude),
            longitude: fix.map(|f| f.longitude),
            created_at: Utc::now(),
            resolved: false,
            resolved_at: None,
            notification_attempts: 0,
            notification_success: false,
        }
    }

    /// Mark the alert resolved. Returns `false` if it already was.
    pub fn resolve(&mut self, at: DateTime<Utc>) -> bool {
        if self.resolved {
            return false;
        }
        self.resolved = true;
        self.resolved_at = Some(at);
        true
    }

    /// Text sent to each notification destination
    pub fn notification_text(&self) -> String {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                format!("ALERT: {} Location: {:.6}, {:.6}", self.message, lat, lon)
            }
            _ => format!("ALERT: {} Location: unknown", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_text() {
        for kind in [
            AlertKind::PerimeterBreach,
            AlertKind::PositionLost,
            AlertKind::Other("LOW_BATTERY".to_string()),
        ] {
            let parsed: AlertKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_kind_serializes_as_string() {
        let json = serde_json::to_string(&AlertKind::PerimeterBreach).unwrap();
        assert_eq!(json, "\"PERIMETER_BREACH\"");
    }

    #[test]
    fn test_resolve_only_once() {
        let mut alert = Alert::new(AlertKind::PositionLost, "GPS signal lost", None);
        let first = Utc::now();
        assert!(alert.resolve(first));
        assert!(!alert.resolve(Utc::now()));
        assert!(alert.resolved);
        assert_eq!(alert.resolved_at, Some(first));
    }

    #[test]
    fn test_notification_text_without_location() {
        let alert = Alert::new(AlertKind::PositionLost, "GPS signal lost for 60 seconds", None);
        assert_eq!(
            alert.notification_text(),
            "ALERT: GPS signal lost for 60 seconds Location: unknown"
        );
    }

    #[test]
    fn test_alert_carries_fix_coordinates() {
        let fix = Fix::new(40.8128, -74.006, Utc::now()).unwrap();
        let alert = Alert::new(AlertKind::PerimeterBreach, "left safe area", Some(&fix));
        assert_eq!(alert.latitude, Some(40.8128));
        assert_eq!(alert.longitude, Some(-74.006));
        assert!(alert.notification_text().contains("40.812800, -74.006000"));
    }
}
