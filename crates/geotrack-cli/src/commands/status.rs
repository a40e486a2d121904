//! Status command implementation

use crate::commands::Globals;
use crate::config_loader;
use crate::output::OutputWriter;
use crate::output_types::StatusOutput;
use crate::storage;
use anyhow::Result;
use geotrack_store::LocationStore;

pub async fn execute(globals: &Globals, output: &OutputWriter) -> Result<()> {
    let config = config_loader::load_config(&globals.config_path, globals.overrides())?;
    let settings = config.settings();
    let store = storage::open_store(&settings).await?;

    let latest = store.latest().await?;
    let statistics = store.statistics().await?;
    let geofence = latest.as_ref().map(|fix| geotrack_geo::evaluate(fix, &settings.geofence));
    store.close().await;

    if output.is_json() {
        return output.result(StatusOutput {
            subject_id: settings.subject_id,
            database: settings.database.display().to_string(),
            latest,
            geofence,
            statistics,
        });
    }

    output.section("Subject");
    output.kv("ID", &settings.subject_id);
    output.kv("Database", settings.database.display());

    output.section("Last Known Position");
    match (&latest, geofence) {
        (Some(fix), Some(status)) => {
            output.kv("Coordinates", format!("{:.6}, {:.6}", fix.latitude, fix.longitude));
            output.kv("Captured", fix.captured_at.format("%Y-%m-%d %H:%M:%S UTC"));
            output.kv("Distance from center", format!("{:.2} m", status.distance));
            if !settings.geofence.enabled {
                output.kv("Geofence", "disabled");
            } else if status.within_fence {
                output.kv("Geofence", "inside");
            } else {
                output.kv("Geofence", "OUTSIDE");
            }
        }
        _ => output.kv("Coordinates", "no fixes recorded"),
    }

    output.section("Store");
    output.kv("Total fixes", statistics.total_fixes);
    output.kv("Fixes (last 24h)", statistics.fixes_last_24h);
    output.kv("Open alerts", statistics.open_alerts);

    if statistics.open_alerts > 0 {
        println!();
        output.warning(format!(
            "{} alert(s) awaiting resolution, see: geotrack alerts --open",
            statistics.open_alerts
        ));
    }

    Ok(())
}
