use crate::error::{GeotrackError, Result};
use crate::models::GeofenceConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "geotrack.toml";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() >= self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Where raw positioning bytes are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Serial device node (or any readable byte stream path)
    Device,
    /// Raw NMEA over TCP
    Tcp,
    /// Deterministic built-in simulator
    Simulator,
    /// Recorded NMEA log file
    Replay,
}

/// Positioning source parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,

    /// Device node or replay file
    pub path: Option<PathBuf>,

    /// `host:port` for the TCP source
    pub address: Option<String>,

    /// Line speed of the receiver. The device must already be configured
    /// for it; the value is reported in logs.
    pub baud_rate: u32,

    /// Upper bound on a single read from the source
    pub read_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Device,
            path: Some(PathBuf::from("/dev/ttyS0")),
            address: None,
            baud_rate: 9600,
            read_timeout_ms: 1000,
        }
    }
}

impl SourceConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Notification transport selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Write alerts to the log only
    Log,
    /// POST alerts to an HTTP SMS gateway
    Webhook,
}

/// Alert delivery parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub kind: NotifierKind,

    /// Destination addresses, notified in order
    pub destinations: Vec<String>,

    /// Gateway endpoint for the webhook notifier
    pub webhook_url: Option<String>,

    /// Upper bound on a single send
    pub send_timeout_secs: u64,

    /// Re-send a still-active alert after this many seconds. Unset means
    /// one notification round per alert.
    pub renotify_interval_secs: Option<u64>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::Log,
            destinations: vec!["+15555550100".to_string()],
            webhook_url: None,
            send_timeout_secs: 30,
            renotify_interval_secs: None,
        }
    }
}

impl NotificationConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub fn renotify_interval(&self) -> Option<Duration> {
        self.renotify_interval_secs.map(Duration::from_secs)
    }
}

/// Per-fix upload to a collection server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Endpoint receiving each fix as JSON. Unset disables uploading.
    pub server_url: Option<String>,

    /// Upper bound on a single upload
    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { server_url: None, timeout_secs: 10 }
    }
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fully resolved settings, handed to component constructors
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSettings {
    pub subject_id: String,
    pub poll_interval: Duration,
    pub position_lost_threshold: u32,
    pub database: PathBuf,
    pub source: SourceConfig,
    pub geofence: GeofenceConfig,
    pub notification: NotificationConfig,
    pub upload: UploadConfig,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        LayeredConfig::with_defaults().settings()
    }
}

/// Layered configuration for GeoTrack
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub subject_id: ConfigValue<String>,
    pub poll_interval_secs: ConfigValue<u64>,
    pub position_lost_threshold: ConfigValue<u32>,
    pub database: ConfigValue<PathBuf>,
    pub source: ConfigValue<SourceConfig>,
    pub geofence: ConfigValue<GeofenceConfig>,
    pub notification: ConfigValue<NotificationConfig>,
    pub upload: ConfigValue<UploadConfig>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            subject_id: ConfigValue::new("PATIENT001".to_string(), ConfigSource::Default),
            poll_interval_secs: ConfigValue::new(10, ConfigSource::Default),
            position_lost_threshold: ConfigValue::new(6, ConfigSource::Default),
            database: ConfigValue::new(PathBuf::from("geotrack.db"), ConfigSource::Default),
            source: ConfigValue::new(SourceConfig::default(), ConfigSource::Default),
            geofence: ConfigValue::new(GeofenceConfig::default(), ConfigSource::Default),
            notification: ConfigValue::new(NotificationConfig::default(), ConfigSource::Default),
            upload: ConfigValue::new(UploadConfig::default(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeotrackError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeotrackError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(subject_id) = file_config.subject_id {
            self.subject_id.update(subject_id, ConfigSource::File);
        }

        if let Some(interval) = file_config.poll_interval_secs {
            self.poll_interval_secs.update(interval, ConfigSource::File);
        }

        if let Some(threshold) = file_config.position_lost_threshold {
            self.position_lost_threshold.update(threshold, ConfigSource::File);
        }

        if let Some(database) = file_config.database {
            self.database.update(database, ConfigSource::File);
        }

        if let Some(source) = file_config.source {
            self.source.update(source, ConfigSource::File);
        }

        if let Some(geofence) = file_config.geofence {
            self.geofence.update(geofence, ConfigSource::File);
        }

        if let Some(notification) = file_config.notification {
            self.notification.update(notification, ConfigSource::File);
        }

        if let Some(upload) = file_config.upload {
            self.upload.update(upload, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load the file at `path`, or write the current values there if it does
    /// not exist yet.
    pub fn load_or_materialize<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return self.load_from_file(path);
        }

        self.save(path)?;
        tracing::info!(path = %path.display(), "Configuration file not found, wrote defaults");
        Ok(self)
    }

    /// Write the current values to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(&self.to_file_config())
            .map_err(|e| GeotrackError::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| GeotrackError::ConfigWrite {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        fs::write(path, content).map_err(|e| GeotrackError::ConfigWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOTRACK_SUBJECT_ID
        if let Ok(subject_id) = env::var("GEOTRACK_SUBJECT_ID") {
            self.subject_id.update(subject_id, ConfigSource::Environment);
        }

        // GEOTRACK_POLL_INTERVAL
        if let Ok(interval_str) = env::var("GEOTRACK_POLL_INTERVAL") {
            match interval_str.parse::<u64>() {
                Ok(interval) => self.poll_interval_secs.update(interval, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOTRACK_POLL_INTERVAL value '{}': expected whole seconds",
                    interval_str
                ),
            }
        }

        // GEOTRACK_LOST_THRESHOLD
        if let Ok(threshold_str) = env::var("GEOTRACK_LOST_THRESHOLD") {
            match threshold_str.parse::<u32>() {
                Ok(threshold) => {
                    self.position_lost_threshold.update(threshold, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid GEOTRACK_LOST_THRESHOLD value '{}': expected a poll count",
                    threshold_str
                ),
            }
        }

        // GEOTRACK_DATABASE
        if let Ok(database) = env::var("GEOTRACK_DATABASE") {
            self.database.update(PathBuf::from(database), ConfigSource::Environment);
        }

        // GEOTRACK_GEOFENCE_ENABLED
        if let Ok(enabled_str) = env::var("GEOTRACK_GEOFENCE_ENABLED") {
            match parse_bool(&enabled_str) {
                Ok(enabled) => {
                    let mut geofence = self.geofence.value;
                    geofence.enabled = enabled;
                    self.geofence.update(geofence, ConfigSource::Environment);
                }
                Err(_) => tracing::warn!(
                    "Invalid GEOTRACK_GEOFENCE_ENABLED value '{}': expected true or false",
                    enabled_str
                ),
            }
        }

        // GEOTRACK_GEOFENCE_RADIUS
        if let Ok(radius_str) = env::var("GEOTRACK_GEOFENCE_RADIUS") {
            match radius_str.parse::<f64>() {
                Ok(radius) => {
                    let mut geofence = self.geofence.value;
                    geofence.radius_meters = radius;
                    self.geofence.update(geofence, ConfigSource::Environment);
                }
                Err(_) => tracing::warn!(
                    "Invalid GEOTRACK_GEOFENCE_RADIUS value '{}': expected meters",
                    radius_str
                ),
            }
        }

        // GEOTRACK_SERVER_URL
        if let Ok(server_url) = env::var("GEOTRACK_SERVER_URL") {
            let mut upload = self.upload.value.clone();
            upload.server_url = Some(server_url).filter(|url| !url.trim().is_empty());
            self.upload.update(upload, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(subject_id) = overrides.subject_id {
            self.subject_id.update(subject_id, ConfigSource::Cli);
        }

        if let Some(interval) = overrides.poll_interval_secs {
            self.poll_interval_secs.update(interval, ConfigSource::Cli);
        }

        if let Some(database) = overrides.database {
            self.database.update(database, ConfigSource::Cli);
        }

        if let Some(kind) = overrides.source_kind {
            let mut source = self.source.value.clone();
            source.kind = kind;
            self.source.update(source, ConfigSource::Cli);
        }
    }

    /// Check every value that would make tracking meaningless
    pub fn validate(&self) -> Result<()> {
        if self.subject_id.value.trim().is_empty() {
            return Err(GeotrackError::ConfigMissing {
                key: "subject_id".to_string(),
            });
        }

        if self.poll_interval_secs.value == 0 {
            return Err(GeotrackError::ConfigInvalid {
                key: "poll_interval_secs".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        if self.position_lost_threshold.value == 0 {
            return Err(GeotrackError::ConfigInvalid {
                key: "position_lost_threshold".to_string(),
                reason: "must be at least 1 poll".to_string(),
            });
        }

        self.geofence.value.validate()?;

        let source = &self.source.value;
        match source.kind {
            SourceKind::Device | SourceKind::Replay if source.path.is_none() => {
                return Err(GeotrackError::ConfigMissing {
                    key: "source.path".to_string(),
                });
            }
            SourceKind::Tcp if source.address.is_none() => {
                return Err(GeotrackError::ConfigMissing {
                    key: "source.address".to_string(),
                });
            }
            _ => {}
        }

        if source.read_timeout_ms == 0 {
            return Err(GeotrackError::ConfigInvalid {
                key: "source.read_timeout_ms".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let notification = &self.notification.value;
        if notification.kind == NotifierKind::Webhook && notification.webhook_url.is_none() {
            return Err(GeotrackError::ConfigMissing {
                key: "notification.webhook_url".to_string(),
            });
        }

        if notification.send_timeout_secs == 0 {
            return Err(GeotrackError::ConfigInvalid {
                key: "notification.send_timeout_secs".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        let upload = &self.upload.value;
        if let Some(url) = &upload.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(GeotrackError::ConfigInvalid {
                    key: "upload.server_url".to_string(),
                    reason: format!("'{}' is not an http(s) URL", url),
                });
            }
        }

        if upload.timeout_secs == 0 {
            return Err(GeotrackError::ConfigInvalid {
                key: "upload.timeout_secs".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    /// Resolve the layered values into plain settings
    pub fn settings(&self) -> TrackerSettings {
        TrackerSettings {
            subject_id: self.subject_id.value.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_secs.value),
            position_lost_threshold: self.position_lost_threshold.value,
            database: self.database.value.clone(),
            source: self.source.value.clone(),
            geofence: self.geofence.value,
            notification: self.notification.value.clone(),
            upload: self.upload.value.clone(),
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("subject_id".to_string(), (self.subject_id.value.clone(), self.subject_id.source));

        map.insert(
            "poll_interval_secs".to_string(),
            (self.poll_interval_secs.value.to_string(), self.poll_interval_secs.source),
        );

        map.insert(
            "position_lost_threshold".to_string(),
            (self.position_lost_threshold.value.to_string(), self.position_lost_threshold.source),
        );

        map.insert(
            "database".to_string(),
            (self.database.value.display().to_string(), self.database.source),
        );

        let source = &self.source.value;
        let source_target = match source.kind {
            SourceKind::Tcp => source.address.clone().unwrap_or_default(),
            SourceKind::Simulator => "built-in".to_string(),
            SourceKind::Device | SourceKind::Replay => {
                source.path.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
            }
        };
        map.insert(
            "source".to_string(),
            (format!("{:?} {}", source.kind, source_target), self.source.source),
        );

        let geofence = &self.geofence.value;
        map.insert(
            "geofence".to_string(),
            (
                format!(
                    "{} ({:.6}, {:.6}) r={}m",
                    if geofence.enabled { "enabled" } else { "disabled" },
                    geofence.latitude,
                    geofence.longitude,
                    geofence.radius_meters
                ),
                self.geofence.source,
            ),
        );

        let notification = &self.notification.value;
        map.insert(
            "notification".to_string(),
            (
                format!("{:?} -> {}", notification.kind, notification.destinations.join(", ")),
                self.notification.source,
            ),
        );

        map.insert(
            "upload".to_string(),
            (
                self.upload.value.server_url.clone().unwrap_or_else(|| "disabled".to_string()),
                self.upload.source,
            ),
        );

        map
    }

    fn to_file_config(&self) -> FileConfig {
        FileConfig {
            subject_id: Some(self.subject_id.value.clone()),
            poll_interval_secs: Some(self.poll_interval_secs.value),
            position_lost_threshold: Some(self.position_lost_threshold.value),
            database: Some(self.database.value.clone()),
            source: Some(self.source.value.clone()),
            geofence: Some(self.geofence.value),
            notification: Some(self.notification.value.clone()),
            upload: Some(self.upload.value.clone()),
        }
    }
}

/// Configuration loaded from TOML file
///
/// Scalar keys come before tables so the file serializes cleanly.
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    subject_id: Option<String>,
    poll_interval_secs: Option<u64>,
    position_lost_threshold: Option<u32>,
    database: Option<PathBuf>,
    source: Option<SourceConfig>,
    geofence: Option<GeofenceConfig>,
    notification: Option<NotificationConfig>,
    upload: Option<UploadConfig>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub subject_id: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub database: Option<PathBuf>,
    pub source_kind: Option<SourceKind>,
}

/// Parse a boolean flag from string
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(GeotrackError::ConfigInvalid {
            key: "flag".to_string(),
            reason: format!("Invalid boolean: {}. Use true or false", s),
        }),
    }
}

/// Parse source kind from string
pub fn parse_source_kind(s: &str) -> Result<SourceKind> {
    match s.to_lowercase().as_str() {
        "device" | "serial" => Ok(SourceKind::Device),
        "tcp" => Ok(SourceKind::Tcp),
        "simulator" | "sim" => Ok(SourceKind::Simulator),
        "replay" => Ok(SourceKind::Replay),
        _ => Err(GeotrackError::ConfigInvalid {
            key: "source.kind".to_string(),
            reason: format!("Invalid source kind: {}. Use device, tcp, simulator, or replay", s),
        }),
    }
}
