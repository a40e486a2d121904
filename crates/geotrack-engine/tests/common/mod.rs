#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geotrack_core::config::NotificationConfig;
use geotrack_core::models::{Alert, AlertId, Fix, GeofenceConfig, SystemEvent};
use geotrack_core::ports::{FixUploader, Notifier, PositionSource};
use geotrack_core::{nmea, GeotrackError, Result};
use geotrack_engine::{AlertManager, TrackerConfig, TrackingLoop};
use geotrack_store::{LocationStore, MemoryStore, StoreStats};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CENTER: (f64, f64) = (40.7128, -74.0060);

/// One scripted read
pub enum Step {
    Bytes(Vec<u8>),
    Fail,
    Misconfigured,
    Hang,
}

/// Source replaying a fixed script, then returning empty reads
pub struct ScriptedSource {
    steps: VecDeque<Step>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps: steps.into() }
    }
}

#[async_trait]
impl PositionSource for ScriptedSource {
    async fn read(&mut self) -> Result<Vec<u8>> {
        match self.steps.pop_front() {
            Some(Step::Bytes(bytes)) => Ok(bytes),
            Some(Step::Fail) => Err(GeotrackError::Source("device unplugged".into())),
            Some(Step::Misconfigured) => {
                Err(GeotrackError::ConfigMissing { key: "source.address".into() })
            }
            Some(Step::Hang) => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Records uploads; `failing` refuses every one, `hang` never answers
#[derive(Default)]
pub struct RecordingUploader {
    pub failing: bool,
    pub hang: bool,
    pub uploaded: Mutex<Vec<Fix>>,
}

impl RecordingUploader {
    pub fn uploaded(&self) -> Vec<Fix> {
        self.uploaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl FixUploader for RecordingUploader {
    async fn upload(&self, fix: &Fix) -> Result<()> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.uploaded.lock().unwrap().push(fix.clone());
        if self.failing {
            return Err(GeotrackError::Upload {
                url: "http://collector.test/api/location".to_string(),
                reason: "server answered 503".to_string(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}

/// Records sends; destinations in `failing` are refused
#[derive(Default)]
pub struct RecordingNotifier {
    pub failing: Vec<String>,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, destination: &str, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((destination.to_string(), text.to_string()));
        if self.failing.iter().any(|d| d == destination) {
            return Err(GeotrackError::Notification {
                destination: destination.to_string(),
                reason: "modem offline".to_string(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Memory store whose fix appends always fail
#[derive(Clone, Default)]
pub struct BrokenAppendStore {
    pub inner: MemoryStore,
}

#[async_trait]
impl LocationStore for BrokenAppendStore {
    async fn append(&self, _fix: &Fix) -> Result<i64> {
        Err(GeotrackError::Storage("disk full".into()))
    }
    async fn latest(&self) -> Result<Option<Fix>> {
        self.inner.latest().await
    }
    async fn since(&self, since: DateTime<Utc>) -> Result<Vec<Fix>> {
        self.inner.since(since).await
    }
    async fn append_alert(&self, alert: &Alert) -> Result<AlertId> {
        self.inner.append_alert(alert).await
    }
    async fn record_delivery(&self, id: AlertId, attempts: u32, success: bool) -> Result<()> {
        self.inner.record_delivery(id, attempts, success).await
    }
    async fn resolve(&self, id: AlertId) -> Result<bool> {
        self.inner.resolve(id).await
    }
    async fn open_alerts(&self) -> Result<Vec<Alert>> {
        self.inner.open_alerts().await
    }
    async fn alerts(&self, limit: usize) -> Result<Vec<Alert>> {
        self.inner.alerts(limit).await
    }
    async fn record_event(&self, event: &SystemEvent) -> Result<()> {
        self.inner.record_event(event).await
    }
    async fn statistics(&self) -> Result<StoreStats> {
        self.inner.statistics().await
    }
}

/// A GGA sentence for the given position
pub fn gga(lat: f64, lon: f64) -> Step {
    let fix = Fix::new(lat, lon, Utc::now()).unwrap().with_satellites(8);
    Step::Bytes(format!("{}\r\n", nmea::encode_gga(&fix)).into_bytes())
}

pub fn empty() -> Step {
    Step::Bytes(Vec::new())
}

pub fn tracker_config() -> TrackerConfig {
    TrackerConfig {
        poll_interval: Duration::from_millis(10),
        position_lost_threshold: 6,
        read_timeout: Duration::from_millis(200),
        upload_timeout: Duration::from_millis(200),
        geofence: GeofenceConfig::new(CENTER.0, CENTER.1, 100.0),
    }
}

pub fn notification_config(destinations: &[&str]) -> NotificationConfig {
    NotificationConfig {
        destinations: destinations.iter().map(|d| d.to_string()).collect(),
        send_timeout_secs: 1,
        ..NotificationConfig::default()
    }
}

pub struct Harness {
    pub tracking_loop: TrackingLoop,
    pub store: MemoryStore,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness(steps: Vec<Step>, destinations: &[&str]) -> Harness {
    harness_with(steps, tracker_config(), RecordingNotifier::default(), destinations)
}

pub fn harness_with(
    steps: Vec<Step>,
    config: TrackerConfig,
    notifier: RecordingNotifier,
    destinations: &[&str],
) -> Harness {
    let store = MemoryStore::new();
    let notifier = Arc::new(notifier);
    let alerts = AlertManager::new(
        Arc::new(store.clone()),
        notifier.clone(),
        &notification_config(destinations),
    );
    let tracking_loop =
        TrackingLoop::new(config, Box::new(ScriptedSource::new(steps)), Arc::new(store.clone()), alerts);

    Harness { tracking_loop, store, notifier }
}
