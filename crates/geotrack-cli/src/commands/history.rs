//! History command implementation

use crate::cli::HistoryArgs;
use crate::commands::Globals;
use crate::config_loader;
use crate::output::OutputWriter;
use crate::output_types::FixRow;
use crate::storage;
use anyhow::Result;
use chrono::{Duration, Utc};
use geotrack_store::LocationStore;

pub async fn execute(args: HistoryArgs, globals: &Globals, output: &OutputWriter) -> Result<()> {
    let config = config_loader::load_config(&globals.config_path, globals.overrides())?;
    let store = storage::open_store(&config.settings()).await?;

    let since = Utc::now() - Duration::hours(i64::from(args.hours));
    let fixes = store.since(since).await?;
    store.close().await;

    output.section(format!("Fixes in the last {} hour(s): {}", args.hours, fixes.len()));
    output.table(fixes.iter().map(FixRow::from).collect())
}
