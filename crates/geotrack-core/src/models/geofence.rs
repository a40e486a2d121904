use serde::{Deserialize, Serialize};

use super::fix::is_valid_coordinate;
use crate::error::{GeotrackError, Result};

/// Circular safe-area perimeter
///
/// Supplied once at startup and never changed while the tracker runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeofenceConfig {
    /// Whether breaches are reported at all
    pub enabled: bool,

    /// Center latitude in degrees
    pub latitude: f64,

    /// Center longitude in degrees
    pub longitude: f64,

    /// Radius of the safe area in meters
    pub radius_meters: f64,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latitude: 40.7128,
            longitude: -74.0060,
            radius_meters: 100.0,
        }
    }
}

impl GeofenceConfig {
    pub fn new(latitude: f64, longitude: f64, radius_meters: f64) -> Self {
        Self {
            enabled: true,
            latitude,
            longitude,
            radius_meters,
        }
    }

    /// Validate center and radius
    pub fn validate(&self) -> Result<()> {
        if !is_valid_coordinate(self.latitude, self.longitude) {
            return Err(GeotrackError::ConfigInvalid {
                key: "geofence.center".to_string(),
                reason: format!(
                    "({}, {}) is not a valid latitude/longitude",
                    self.latitude, self.longitude
                ),
            });
        }

        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(GeotrackError::ConfigInvalid {
                key: "geofence.radius_meters".to_string(),
                reason: format!("must be a positive number, got {}", self.radius_meters),
            });
        }

        Ok(())
    }
}

/// Result of evaluating a fix against a geofence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofenceStatus {
    /// `true` when inside the perimeter, or when the geofence is disabled
    pub within_fence: bool,

    /// Great-circle distance from the center in meters
    pub distance: f64,
}
