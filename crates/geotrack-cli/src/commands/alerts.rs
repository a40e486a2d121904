//! Alerts command implementation

use crate::cli::AlertsArgs;
use crate::commands::Globals;
use crate::config_loader;
use crate::output::OutputWriter;
use crate::output_types::AlertRow;
use crate::storage;
use anyhow::Result;
use geotrack_store::LocationStore;

pub async fn execute(args: AlertsArgs, globals: &Globals, output: &OutputWriter) -> Result<()> {
    let config = config_loader::load_config(&globals.config_path, globals.overrides())?;
    let store = storage::open_store(&config.settings()).await?;

    let alerts = if args.open {
        store.open_alerts().await?
    } else {
        store.alerts(args.limit).await?
    };
    store.close().await;

    output.section(if args.open { "Open alerts" } else { "Recent alerts" });
    output.table(alerts.iter().map(AlertRow::from).collect())
}
