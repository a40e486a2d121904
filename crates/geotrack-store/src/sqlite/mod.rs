//! SQLite storage adapter implementation

pub mod config;
pub mod migrations;

mod location;
mod rows;

pub use config::{ConfigError, PoolConfig, SqliteConfig};
pub use migrations::{MigrationError, MigrationManager, MigrationStatus};

use geotrack_core::error::{GeotrackError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

/// SQLite storage adapter
///
/// Every write is committed with `synchronous = FULL` before returning.
/// Writers are serialized by a process-wide lock held for one statement;
/// readers use the WAL and are never blocked by it.
pub struct SqliteStore {
    pool: SqlitePool,
    subject_id: String,
    write_lock: Mutex<()>,
}

impl SqliteStore {
    /// Open (creating if needed) the database and apply pending migrations
    pub async fn open(config: SqliteConfig) -> Result<Self> {
        config.validate().map_err(|e| GeotrackError::ConfigInvalid {
            key: "database".to_string(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool.max_connections)
            .acquire_timeout(config.pool.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                GeotrackError::Storage(format!(
                    "Failed to open database {}: {}",
                    config.path.display(),
                    e
                ))
            })?;

        let store = Self { pool, subject_id: config.subject_id, write_lock: Mutex::new(()) };
        store.run_migrations().await?;

        tracing::debug!(path = %config.path.display(), subject = %store.subject_id, "Location store opened");

        Ok(store)
    }

    /// Run all pending migrations
    pub async fn run_migrations(&self) -> Result<()> {
        MigrationManager::new(self.pool.clone())
            .run_migrations()
            .await
            .map_err(|e| GeotrackError::Storage(format!("Migration failed: {}", e)))
    }

    /// Check migration status
    pub async fn migration_status(&self) -> Result<Vec<MigrationStatus>> {
        MigrationManager::new(self.pool.clone())
            .check_status()
            .await
            .map_err(|e| GeotrackError::Storage(format!("Failed to check migration status: {}", e)))
    }

    /// Subject every record of this store is attributed to
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Close the pool, waiting for in-flight statements
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn db_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> GeotrackError {
    move |e| GeotrackError::Storage(format!("Failed to {}: {}", action, e))
}
