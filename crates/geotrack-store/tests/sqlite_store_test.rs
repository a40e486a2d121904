use chrono::{Duration, Utc};
use geotrack_core::models::{Alert, AlertId, AlertKind, Fix, FixQuality, SystemEvent};
use geotrack_core::GeotrackError;
use geotrack_store::{LocationStore, SqliteConfig, SqliteStore};
use std::sync::Arc;
use tempfile::TempDir;

async fn open_store(dir: &TempDir, subject: &str) -> SqliteStore {
    let config = SqliteConfig::new(dir.path().join("history.db"), subject).unwrap();
    SqliteStore::open(config).await.unwrap()
}

fn fix_at(lat: f64, lon: f64, minutes_ago: i64) -> Fix {
    Fix::new(lat, lon, Utc::now() - Duration::minutes(minutes_ago)).unwrap()
}

#[tokio::test]
async fn test_latest_round_trips_full_precision() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "PATIENT001").await;

    assert!(store.latest().await.unwrap().is_none());

    let fix = fix_at(40.712_812_345_678_9, -74.006_012_345_678_9, 0)
        .with_altitude(10.5)
        .with_speed(1.234)
        .with_satellites(8)
        .with_quality(FixQuality::Dgps);
    let seq = store.append(&fix).await.unwrap();
    assert!(seq > 0);

    let latest = store.latest().await.unwrap().unwrap();
    assert_eq!(latest.latitude, fix.latitude);
    assert_eq!(latest.longitude, fix.longitude);
    assert_eq!(latest.altitude, Some(10.5));
    assert_eq!(latest.speed, Some(1.234));
    assert_eq!(latest.satellites, Some(8));
    assert_eq!(latest.quality, Some(FixQuality::Dgps));
    assert_eq!(latest.captured_at.timestamp_micros(), fix.captured_at.timestamp_micros());
}

#[tokio::test]
async fn test_append_is_monotonic_and_never_overwrites() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "PATIENT001").await;

    let first = store.append(&fix_at(1.0, 1.0, 3)).await.unwrap();
    let second = store.append(&fix_at(1.0, 1.0, 3)).await.unwrap();
    assert!(second > first);

    let stats = store.statistics().await.unwrap();
    assert_eq!(stats.total_fixes, 2);
}

#[tokio::test]
async fn test_since_orders_by_capture_time() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "PATIENT001").await;

    store.append(&fix_at(1.0, 1.0, 180)).await.unwrap();
    store.append(&fix_at(3.0, 3.0, 5)).await.unwrap();
    store.append(&fix_at(2.0, 2.0, 30)).await.unwrap();

    let fixes = store.since(Utc::now() - Duration::hours(1)).await.unwrap();
    let lats: Vec<f64> = fixes.iter().map(|f| f.latitude).collect();
    assert_eq!(lats, vec![2.0, 3.0]);
}

#[tokio::test]
async fn test_alert_resolution() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "PATIENT001").await;

    let fix = fix_at(40.8128, -74.0060, 0);
    let alert = Alert::new(AlertKind::PerimeterBreach, "Subject left safe zone", Some(&fix));
    let id = store.append_alert(&alert).await.unwrap();
    store.record_delivery(id, 2, true).await.unwrap();

    let open = store.open_alerts().await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, Some(id));
    assert_eq!(open[0].kind, AlertKind::PerimeterBreach);
    assert_eq!(open[0].latitude, Some(40.8128));
    assert_eq!(open[0].notification_attempts, 2);
    assert!(open[0].notification_success);

    assert!(store.resolve(id).await.unwrap());
    assert!(!store.resolve(id).await.unwrap());
    assert!(store.open_alerts().await.unwrap().is_empty());

    let all = store.alerts(10).await.unwrap();
    assert!(all[0].resolved);
    assert!(all[0].resolved_at.is_some());
}

#[tokio::test]
async fn test_unknown_alert_is_reported() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "PATIENT001").await;

    assert!(matches!(
        store.resolve(AlertId(99)).await,
        Err(GeotrackError::AlertNotFound { id: 99 })
    ));
    assert!(matches!(
        store.record_delivery(AlertId(99), 1, false).await,
        Err(GeotrackError::AlertNotFound { id: 99 })
    ));
}

#[tokio::test]
async fn test_alerts_listing_is_newest_first() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "PATIENT001").await;

    for i in 0..5 {
        let alert = Alert::new(AlertKind::Other(format!("KIND_{}", i)), "test", None);
        store.append_alert(&alert).await.unwrap();
    }

    let recent = store.alerts(3).await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].kind, AlertKind::Other("KIND_4".into()));
    assert_eq!(recent[2].kind, AlertKind::Other("KIND_2".into()));
    assert!(recent[0].latitude.is_none());
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir, "PATIENT001").await;
        store.append(&fix_at(51.5, -0.12, 0)).await.unwrap();
        store.record_event(&SystemEvent::new("TRACKING", "STARTED", "test")).await.unwrap();
        store.close().await;
    }

    let store = open_store(&dir, "PATIENT001").await;
    let latest = store.latest().await.unwrap().unwrap();
    assert_eq!(latest.latitude, 51.5);

    let status = store.migration_status().await.unwrap();
    assert!(!status.is_empty());
    assert!(status.iter().all(|m| m.applied));
}

#[tokio::test]
async fn test_records_are_scoped_to_subject() {
    let dir = TempDir::new().unwrap();
    let first = open_store(&dir, "PATIENT001").await;
    let second = open_store(&dir, "PATIENT002").await;

    first.append(&fix_at(1.0, 1.0, 0)).await.unwrap();
    first
        .append_alert(&Alert::new(AlertKind::PositionLost, "lost", None))
        .await
        .unwrap();

    assert!(second.latest().await.unwrap().is_none());
    assert!(second.open_alerts().await.unwrap().is_empty());
    assert_eq!(second.statistics().await.unwrap().total_fixes, 0);
}

#[tokio::test]
async fn test_statistics() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "PATIENT001").await;

    let empty = store.statistics().await.unwrap();
    assert_eq!(empty.total_fixes, 0);
    assert!(empty.last_update.is_none());

    store.append(&fix_at(1.0, 1.0, 60 * 30)).await.unwrap();
    let recent = fix_at(2.0, 2.0, 1);
    store.append(&recent).await.unwrap();
    store
        .append_alert(&Alert::new(AlertKind::PositionLost, "lost", None))
        .await
        .unwrap();

    let stats = store.statistics().await.unwrap();
    assert_eq!(stats.total_fixes, 2);
    assert_eq!(stats.fixes_last_24h, 1);
    assert_eq!(stats.open_alerts, 1);
    assert_eq!(
        stats.last_update.map(|t| t.timestamp_micros()),
        Some(recent.captured_at.timestamp_micros())
    );
}

#[tokio::test]
async fn test_readers_run_alongside_writer() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&dir, "PATIENT001").await);

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for i in 0..20 {
                store.append(&fix_at(10.0 + i as f64 * 0.001, 20.0, 0)).await.unwrap();
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..3 {
        let store = Arc::clone(&store);
        readers.push(tokio::spawn(async move {
            for _ in 0..20 {
                store.latest().await.unwrap();
                store.statistics().await.unwrap();
            }
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }

    assert_eq!(store.statistics().await.unwrap().total_fixes, 20);
}
