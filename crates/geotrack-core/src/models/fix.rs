use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GeotrackError, Result};

/// GPS fix quality indicator as reported by a GGA sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixQuality {
    /// Standard GPS fix
    Gps,
    /// Differential GPS fix
    Dgps,
    /// Precise positioning service
    Pps,
    /// Real-time kinematic, fixed integers
    RtkFixed,
    /// Real-time kinematic, float integers
    RtkFloat,
    /// Dead reckoning
    Estimated,
    /// Manual input mode
    Manual,
    /// Simulator mode
    Simulation,
}

impl FixQuality {
    /// Map the numeric GGA quality field. `0` (invalid) has no mapping.
    pub fn from_gga(code: u8) -> Option<Self> {
        match code {
            1 => Some(FixQuality::Gps),
            2 => Some(FixQuality::Dgps),
            3 => Some(FixQuality::Pps),
            4 => Some(FixQuality::RtkFixed),
            5 => Some(FixQuality::RtkFloat),
            6 => Some(FixQuality::Estimated),
            7 => Some(FixQuality::Manual),
            8 => Some(FixQuality::Simulation),
            _ => None,
        }
    }

    /// The numeric GGA code for this quality
    pub fn code(self) -> u8 {
        match self {
            FixQuality::Gps => 1,
            FixQuality::Dgps => 2,
            FixQuality::Pps => 3,
            FixQuality::RtkFixed => 4,
            FixQuality::RtkFloat => 5,
            FixQuality::Estimated => 6,
            FixQuality::Manual => 7,
            FixQuality::Simulation => 8,
        }
    }
}

/// A single resolved positioning sample
///
/// Coordinates are always finite and within range; use [`Fix::new`] to
/// construct one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Latitude in degrees (-90 to +90)
    pub latitude: f64,

    /// Longitude in degrees (-180 to +180)
    pub longitude: f64,

    /// Altitude above mean sea level in meters
    pub altitude: Option<f64>,

    /// Speed over ground in meters per second
    pub speed: Option<f64>,

    /// Number of satellites used in the fix
    pub satellites: Option<u8>,

    /// Fix quality indicator
    pub quality: Option<FixQuality>,

    /// Wall-clock time at which the sample was captured
    pub captured_at: DateTime<Utc>,
}

impl Fix {
    /// Create a fix, validating the coordinate ranges
    pub fn new(latitude: f64, longitude: f64, captured_at: DateTime<Utc>) -> Result<Self> {
        if !is_valid_coordinate(latitude, longitude) {
            return Err(GeotrackError::InvalidCoordinate { latitude, longitude });
        }

        Ok(Self {
            latitude,
            longitude,
            altitude: None,
            speed: None,
            satellites: None,
            quality: None,
            captured_at,
        })
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_satellites(mut self, satellites: u8) -> Self {
        self.satellites = Some(satellites);
        self
    }

    pub fn with_quality(mut self, quality: FixQuality) -> Self {
        self.quality = Some(quality);
        self
    }
}

/// Check that a latitude/longitude pair is finite and in range
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}
