//! Location store construction for CLI commands

use anyhow::Result;
use geotrack_core::config::TrackerSettings;
use geotrack_store::{SqliteConfig, SqliteStore};
use std::sync::Arc;

use crate::errors;

/// Open the SQLite store named by the settings, applying migrations
pub async fn open_store(settings: &TrackerSettings) -> Result<Arc<SqliteStore>> {
    let config = SqliteConfig::new(settings.database.clone(), settings.subject_id.clone())
        .map_err(|e| errors::store_unavailable(&settings.database, &e.to_string()))?;

    let store = SqliteStore::open(config)
        .await
        .map_err(|e| errors::store_unavailable(&settings.database, &e.to_string()))?;

    tracing::debug!(database = %settings.database.display(), "Location store ready");
    Ok(Arc::new(store))
}
