//! Run command implementation

use crate::cli::RunArgs;
use crate::commands::Globals;
use crate::config_loader;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::RunOutput;
use crate::storage;
use anyhow::{Context, Result};
use geotrack_core::config::CliConfigOverrides;
use geotrack_engine::{
    build_notifier, build_uploader, open_source, AlertManager, Tracker, TrackerConfig, TrackingLoop,
};
use geotrack_store::LocationStore;
use std::time::Duration;

pub async fn execute(args: RunArgs, globals: &Globals, output: &OutputWriter) -> Result<()> {
    let overrides = CliConfigOverrides {
        subject_id: args.subject,
        poll_interval_secs: args.interval,
        database: globals.database.clone(),
        source_kind: args.source.map(Into::into),
    };
    let config = config_loader::load_or_create_config(&globals.config_path, overrides)?;
    let settings = config.settings();

    let store = storage::open_store(&settings).await?;

    let source = open_source(&settings.source, &settings.geofence)
        .await
        .map_err(|e| {
            if e.is_transient() {
                errors::source_unavailable(&e.to_string())
            } else {
                errors::invalid_config(&e.to_string(), &globals.config_path)
            }
        })?;
    let source_name = source.describe();

    let notifier = build_notifier(&settings.notification, &settings.subject_id)
        .context("Failed to set up notifications")?;

    let alerts = AlertManager::new(store.clone(), notifier, &settings.notification);
    let mut tracking_loop =
        TrackingLoop::new(TrackerConfig::from_settings(&settings), source, store.clone(), alerts);
    if let Some(uploader) = build_uploader(&settings.upload, &settings.subject_id)
        .context("Failed to set up fix upload")?
    {
        output.info(format!("Uploading fixes to {}", uploader.describe()));
        tracking_loop = tracking_loop.with_uploader(uploader);
    }
    let mut tracker = Tracker::new(tracking_loop);

    tracker.start()?;
    output.info(format!(
        "Tracking {} from {} every {}s",
        settings.subject_id,
        source_name,
        settings.poll_interval.as_secs()
    ));

    match args.duration {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                signal = tokio::signal::ctrl_c() => signal.context("Failed to listen for Ctrl-C")?,
            }
        }
        None => {
            output.info("Press Ctrl-C to stop");
            tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
        }
    }

    output.info("Stopping tracker");
    tracker.stop().await?;

    let (cycles, consecutive_failures) = tracker
        .tracking_loop()
        .map(|l| (l.session().cycles, l.session().consecutive_failures))
        .unwrap_or_default();
    let statistics = store.statistics().await?;
    store.close().await;

    if output.is_json() {
        return output.result(RunOutput {
            subject_id: settings.subject_id,
            source: source_name,
            cycles,
            consecutive_failures,
            statistics,
        });
    }

    output.success(format!("Tracking stopped after {} cycle(s)", cycles));
    output.kv("Fixes stored", statistics.total_fixes);
    output.kv("Open alerts", statistics.open_alerts);
    if consecutive_failures > 0 {
        output.kv("Polls without a fix at exit", consecutive_failures);
    }
    Ok(())
}
