use geotrack_core::models::{Fix, GeofenceConfig, GeofenceStatus};

use crate::spatial::distance_meters;

/// Evaluate a fix against a circular geofence
///
/// The distance is always computed. A disabled geofence reports every fix as
/// within the fence. A fix exactly on the perimeter is inside.
pub fn evaluate(fix: &Fix, config: &GeofenceConfig) -> GeofenceStatus {
    let distance = distance_meters(fix.latitude, fix.longitude, config.latitude, config.longitude);

    GeofenceStatus {
        within_fence: !config.enabled || distance <= config.radius_meters,
        distance,
    }
}
