//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use geotrack_core::config::{
    CliConfigOverrides, ConfigSource, LayeredConfig, NotifierKind, SourceKind,
};
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

fn clear_env() {
    for key in [
        "GEOTRACK_SUBJECT_ID",
        "GEOTRACK_POLL_INTERVAL",
        "GEOTRACK_LOST_THRESHOLD",
        "GEOTRACK_DATABASE",
        "GEOTRACK_GEOFENCE_ENABLED",
        "GEOTRACK_GEOFENCE_RADIUS",
        "GEOTRACK_SERVER_URL",
    ] {
        env::remove_var(key);
    }
}

#[test]
fn test_missing_file_materializes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("geotrack.toml");
    assert!(!path.exists());

    let config = LayeredConfig::with_defaults().load_or_materialize(&path).unwrap();

    assert!(path.exists(), "default configuration should be written");
    assert_eq!(config.subject_id.source, ConfigSource::Default);

    // The written file loads back to the same settings
    let reloaded = LayeredConfig::with_defaults().load_from_file(&path).unwrap();
    assert_eq!(reloaded.settings(), config.settings());
    assert_eq!(reloaded.subject_id.source, ConfigSource::File);
}

#[test]
fn test_existing_file_is_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("geotrack.toml");
    fs::write(&path, "subject_id = \"RESIDENT-42\"\n").unwrap();

    let config = LayeredConfig::with_defaults().load_or_materialize(&path).unwrap();

    assert_eq!(config.subject_id.value, "RESIDENT-42");
    assert_eq!(fs::read_to_string(&path).unwrap(), "subject_id = \"RESIDENT-42\"\n");
}

#[test]
fn test_invalid_toml_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "poll_interval_secs = \"soon\"").unwrap();

    let result = LayeredConfig::with_defaults().load_from_file(file.path());
    assert!(result.is_err());
}

#[test]
fn test_notification_table_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[notification]
kind = "webhook"
destinations = ["+15555550100", "+15555550101"]
webhook_url = "http://localhost:8080/sms"
renotify_interval_secs = 600
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();
    let notification = &config.notification.value;

    assert_eq!(notification.kind, NotifierKind::Webhook);
    assert_eq!(notification.destinations.len(), 2);
    assert_eq!(notification.send_timeout_secs, 30);
    assert_eq!(notification.renotify_interval().map(|d| d.as_secs()), Some(600));
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
poll_interval_secs = 30
database = "/var/lib/geotrack/file.db"
"#
    )
    .unwrap();

    env::set_var("GEOTRACK_POLL_INTERVAL", "15");
    env::set_var("GEOTRACK_GEOFENCE_RADIUS", "500");
    env::set_var("GEOTRACK_GEOFENCE_ENABLED", "false");

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.poll_interval_secs.value, 15);
    assert_eq!(config.poll_interval_secs.source, ConfigSource::Environment);
    assert_eq!(config.database.value, PathBuf::from("/var/lib/geotrack/file.db"));
    assert_eq!(config.database.source, ConfigSource::File);
    // Both geofence variables apply on top of each other
    assert_eq!(config.geofence.value.radius_meters, 500.0);
    assert!(!config.geofence.value.enabled);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();
    env::set_var("GEOTRACK_POLL_INTERVAL", "ten");
    env::set_var("GEOTRACK_LOST_THRESHOLD", "-1");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.poll_interval_secs.value, 10);
    assert_eq!(config.poll_interval_secs.source, ConfigSource::Default);
    assert_eq!(config.position_lost_threshold.value, 6);

    clear_env();
}

#[test]
#[serial]
fn test_env_sets_upload_server() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[upload]\ntimeout_secs = 4").unwrap();

    env::set_var("GEOTRACK_SERVER_URL", "http://127.0.0.1:8080/api/location");

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    let upload = config.settings().upload;
    assert_eq!(upload.server_url.as_deref(), Some("http://127.0.0.1:8080/api/location"));
    assert_eq!(upload.timeout_secs, 4);
    assert_eq!(config.upload.source, ConfigSource::Environment);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var("GEOTRACK_SUBJECT_ID", "FROM-ENV");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        subject_id: Some("FROM-CLI".to_string()),
        source_kind: Some(SourceKind::Simulator),
        ..Default::default()
    });

    assert_eq!(config.subject_id.value, "FROM-CLI");
    assert_eq!(config.subject_id.source, ConfigSource::Cli);
    assert_eq!(config.settings().source.kind, SourceKind::Simulator);

    clear_env();
}
