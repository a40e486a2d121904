//! Resolve command implementation

use crate::cli::ResolveArgs;
use crate::commands::Globals;
use crate::config_loader;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::ResolveOutput;
use crate::storage;
use anyhow::Result;
use geotrack_core::models::AlertId;
use geotrack_core::GeotrackError;
use geotrack_store::LocationStore;

pub async fn execute(args: ResolveArgs, globals: &Globals, output: &OutputWriter) -> Result<()> {
    let config = config_loader::load_config(&globals.config_path, globals.overrides())?;
    let store = storage::open_store(&config.settings()).await?;

    let result = store.resolve(AlertId(args.id)).await;
    store.close().await;

    let changed = match result {
        Ok(changed) => changed,
        Err(GeotrackError::AlertNotFound { id }) => return Err(errors::alert_not_found(id).into()),
        Err(e) => return Err(e.into()),
    };

    if output.is_json() {
        return output.result(ResolveOutput { id: args.id, changed });
    }

    if changed {
        output.success(format!("Alert {} resolved", args.id));
    } else {
        output.info(format!("Alert {} was already resolved", args.id));
    }
    Ok(())
}
