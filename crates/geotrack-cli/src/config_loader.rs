//! Configuration loading utilities for CLI commands

use anyhow::Result;
use geotrack_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::Path;

use crate::errors;

/// Resolve configuration without touching the file system
///
/// A missing file falls back to defaults.
pub fn load_config(path: &Path, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if path.exists() {
        config = config
            .load_from_file(path)
            .map_err(|e| errors::invalid_config(&e.to_string(), path))?;
    }
    finish(config, overrides, path)
}

/// Resolve configuration, writing a default file first if none exists
pub fn load_or_create_config(path: &Path, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let config = LayeredConfig::with_defaults()
        .load_or_materialize(path)
        .map_err(|e| errors::invalid_config(&e.to_string(), path))?;
    finish(config, overrides, path)
}

fn finish(config: LayeredConfig, overrides: CliConfigOverrides, path: &Path) -> Result<LayeredConfig> {
    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    config.validate().map_err(|e| errors::invalid_config(&e.to_string(), path))?;
    Ok(config)
}
