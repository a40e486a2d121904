//! GeoTrack Geo - Distance and geofence evaluation
//!
//! Pure functions only: nothing in this crate performs I/O or keeps state.

pub mod geofence;
pub mod spatial;

pub use geofence::evaluate;
pub use spatial::{destination, distance_meters, EARTH_RADIUS_METERS};
