//! Init command implementation

use crate::cli::InitArgs;
use crate::commands::Globals;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::InitOutput;
use anyhow::{Context, Result};
use geotrack_core::config::LayeredConfig;

pub fn execute(args: InitArgs, globals: &Globals, output: &OutputWriter) -> Result<()> {
    let path = &globals.config_path;
    let existed = path.exists();

    if existed && !args.force {
        return Err(errors::config_exists(path).into());
    }

    LayeredConfig::with_defaults()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if output.is_json() {
        output.result(InitOutput {
            config_path: path.display().to_string(),
            overwritten: existed,
        })?;
    } else {
        output.success(format!("Wrote default configuration to {}", path.display()));
        output.info("Edit the [geofence] and [notification] sections, then run: geotrack run");
    }

    Ok(())
}
