//! Error types for GeoTrack

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeotrackError {
    // Domain errors
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Alert not found: {id}")]
    AlertNotFound { id: i64 },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Configuration file not writable at {path}: {reason}")]
    ConfigWrite { path: PathBuf, reason: String },

    // Collaborator errors
    #[error("Positioning source failure: {0}")]
    Source(String),

    #[error("Positioning source did not respond within {0:?}")]
    SourceTimeout(Duration),

    #[error("Notification to {destination} failed: {reason}")]
    Notification { destination: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Upload to {url} failed: {reason}")]
    Upload { url: String, reason: String },

    // Lifecycle errors
    #[error("Tracker is already running")]
    AlreadyRunning,

    #[error("Tracking worker terminated abnormally: {0}")]
    WorkerFailed(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeotrackError {
    /// Whether the tracking loop should log this error and carry on.
    ///
    /// Configuration and lifecycle errors are fatal at startup; everything
    /// raised by a collaborator during a poll cycle is transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GeotrackError::Source(_)
                | GeotrackError::SourceTimeout(_)
                | GeotrackError::Notification { .. }
                | GeotrackError::Upload { .. }
                | GeotrackError::Storage(_)
                | GeotrackError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GeotrackError>;
