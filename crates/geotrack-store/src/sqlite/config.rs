//! SQLite configuration

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// SQLite connection and behavior configuration
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file, created if missing
    pub path: PathBuf,
    /// Subject every record is attributed to
    pub subject_id: String,
    /// Connection pool configuration
    pub pool: PoolConfig,
    /// How long a connection waits on a locked database
    pub busy_timeout: Duration,
}

impl SqliteConfig {
    /// Create a new configuration for the given database file and subject
    pub fn new(path: impl Into<PathBuf>, subject_id: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            path: path.into(),
            subject_id: subject_id.into(),
            pool: PoolConfig::default(),
            busy_timeout: Duration::from_secs(5),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "database".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        if self.subject_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "subject_id".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        self.pool.validate()
    }
}

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections; readers share the pool with the writer
    pub max_connections: u32,
    /// Timeout for acquiring a connection from the pool
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_connections: 4, acquire_timeout: Duration::from_secs(10) }
    }
}

impl PoolConfig {
    /// Validate pool configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "max_connections".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.acquire_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "acquire_timeout".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_uses_defaults() {
        let config = SqliteConfig::new("geotrack.db", "PATIENT001").unwrap();
        assert_eq!(config.pool.max_connections, 4);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_empty_values() {
        assert!(SqliteConfig::new("", "PATIENT001").is_err());
        assert!(SqliteConfig::new("geotrack.db", "  ").is_err());
    }

    #[test]
    fn test_pool_validation() {
        let pool = PoolConfig { max_connections: 0, ..PoolConfig::default() };
        assert!(pool.validate().is_err());
        assert!(PoolConfig::default().validate().is_ok());
    }
}
