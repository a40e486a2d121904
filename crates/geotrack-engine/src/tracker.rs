//! The background tracking loop
//!
//! [`TrackingLoop`] owns the session state and runs one poll cycle at a time.
//! [`Tracker`] moves it onto a dedicated task and drives the
//! `Stopped -> Running -> Stopping -> Stopped` lifecycle.

use chrono::Utc;
use geotrack_core::config::TrackerSettings;
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::models::{AlertKind, Fix, GeofenceConfig, SystemEvent};
use geotrack_core::nmea;
use geotrack_core::ports::{FixUploader, PositionSource};
use geotrack_store::LocationStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::alert::AlertManager;
use crate::session::{CycleReport, TrackerState, TrackingSession};

/// Allowance on top of the source's own read window before a read is
/// abandoned
pub const READ_GRACE: Duration = Duration::from_secs(2);

/// Parameters of the poll cycle
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Sleep between the end of one cycle and the start of the next
    pub poll_interval: Duration,

    /// Consecutive empty polls before POSITION_LOST is raised
    pub position_lost_threshold: u32,

    /// Hard bound on one source read
    pub read_timeout: Duration,

    /// Hard bound on one fix upload
    pub upload_timeout: Duration,

    pub geofence: GeofenceConfig,
}

impl TrackerConfig {
    pub fn from_settings(settings: &TrackerSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval,
            position_lost_threshold: settings.position_lost_threshold,
            read_timeout: settings.source.read_timeout() + READ_GRACE,
            upload_timeout: settings.upload.timeout() + READ_GRACE,
            geofence: settings.geofence,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::from_settings(&TrackerSettings::default())
    }
}

/// Sequential poll cycle over a positioning source
pub struct TrackingLoop {
    config: TrackerConfig,
    source: Box<dyn PositionSource>,
    store: Arc<dyn LocationStore>,
    alerts: AlertManager,
    uploader: Option<Arc<dyn FixUploader>>,
    session: TrackingSession,
}

impl TrackingLoop {
    pub fn new(
        config: TrackerConfig,
        source: Box<dyn PositionSource>,
        store: Arc<dyn LocationStore>,
        alerts: AlertManager,
    ) -> Self {
        Self { config, source, store, alerts, uploader: None, session: TrackingSession::new() }
    }

    /// Forward every acquired fix to `uploader`
    pub fn with_uploader(mut self, uploader: Arc<dyn FixUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn session(&self) -> &TrackingSession {
        &self.session
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.alerts
    }

    /// Run one poll cycle
    ///
    /// Never fails: source, storage and notification problems are logged and
    /// folded into the report.
    pub async fn poll_once(&mut self) -> CycleReport {
        self.session.cycles += 1;
        let mut report = CycleReport { cycle: self.session.cycles, ..CycleReport::default() };

        let bytes = self.read_source(&mut report).await;
        let decoded = nmea::decode_bytes(&bytes, Utc::now());
        report.rejected_sentences = decoded.rejected.len();

        match decoded.fix {
            Some(fix) => self.handle_fix(fix, &mut report).await,
            None => self.handle_no_fix(&mut report).await,
        }

        report.consecutive_failures = self.session.consecutive_failures;
        report
    }

    async fn read_source(&mut self, report: &mut CycleReport) -> Vec<u8> {
        let result = match tokio::time::timeout(self.config.read_timeout, self.source.read()).await {
            Ok(result) => result,
            Err(_) => Err(GeotrackError::SourceTimeout(self.config.read_timeout)),
        };

        match result {
            Ok(bytes) => {
                if self.session.source_failing {
                    self.session.source_failing = false;
                    tracing::info!(source = %self.source.describe(), "Positioning source recovered");
                    self.record_event("SOURCE", "RECOVERED", self.source.describe()).await;
                }
                bytes
            }
            Err(e) => {
                // A non-transient error will not clear on its own but still counts as an empty poll
                let status = if e.is_transient() {
                    tracing::warn!(source = %self.source.describe(), error = %e, "Positioning source read failed");
                    "FAILED"
                } else {
                    tracing::error!(source = %self.source.describe(), error = %e, "Positioning source is misconfigured");
                    "ERROR"
                };
                if !self.session.source_failing {
                    self.session.source_failing = true;
                    self.record_event("SOURCE", status, e.to_string()).await;
                }
                report.source_error = Some(e.to_string());
                Vec::new()
            }
        }
    }

    async fn handle_fix(&mut self, fix: Fix, report: &mut CycleReport) {
        self.session.record_fix(fix.clone());

        match self.store.append(&fix).await {
            Ok(_) => report.stored = true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist fix; sample dropped");
            }
        }

        if let Some(uploader) = &self.uploader {
            let uploaded = upload_fix(uploader.as_ref(), &fix, self.config.upload_timeout).await;
            report.uploaded = Some(uploaded);
        }

        let status = geotrack_geo::evaluate(&fix, &self.config.geofence);

        tracing::info!(
            latitude = fix.latitude,
            longitude = fix.longitude,
            distance = status.distance,
            within_fence = status.within_fence,
            "Fix acquired"
        );

        if status.within_fence {
            if self.alerts.report_clear(&AlertKind::PerimeterBreach).await {
                report.cleared.push(AlertKind::PerimeterBreach);
            }
        } else {
            let message = format!("Subject left safe area. Distance: {:.2}m", status.distance);
            if let Some(alert) =
                self.alerts.report_breach(AlertKind::PerimeterBreach, &message, Some(&fix)).await
            {
                report.raised.push(alert);
            }
        }

        if self.alerts.report_clear(&AlertKind::PositionLost).await {
            report.cleared.push(AlertKind::PositionLost);
        }

        report.geofence = Some(status);
        report.fix = Some(fix);
    }

    async fn handle_no_fix(&mut self, report: &mut CycleReport) {
        let failures = self.session.record_miss();
        let threshold = self.config.position_lost_threshold;

        if failures < threshold {
            tracing::debug!(failures, threshold, "No GPS fix this cycle");
            return;
        }

        if failures == threshold {
            tracing::warn!(failures, "No GPS fix for too many consecutive polls");
        }

        let message = format!("GPS position lost for {} consecutive polls", failures);
        let last_fix = self.session.last_fix.clone();
        if let Some(alert) =
            self.alerts.report_breach(AlertKind::PositionLost, &message, last_fix.as_ref()).await
        {
            report.raised.push(alert);
        }
    }

    async fn record_event(&mut self, component: &str, status: &str, message: impl Into<String>) {
        let event = SystemEvent::new(component, status, message);
        if let Err(e) = self.store.record_event(&event).await {
            tracing::debug!(error = %e, "Failed to record system event");
        }
    }

    async fn run(mut self, mut stop: watch::Receiver<bool>) -> Self {
        tracing::info!(
            source = %self.source.describe(),
            poll_interval = ?self.config.poll_interval,
            threshold = self.config.position_lost_threshold,
            "Tracking loop started"
        );
        self.record_event("TRACKING", "STARTED", self.source.describe()).await;

        loop {
            if *stop.borrow() {
                break;
            }

            let report = self.poll_once().await;
            tracing::trace!(
                cycle = report.cycle,
                failures = report.consecutive_failures,
                raised = report.raised.len(),
                "Cycle complete"
            );

            let stopped = tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => false,
                changed = stop.changed() => changed.is_err() || *stop.borrow(),
            };
            if stopped {
                break;
            }
        }

        self.record_event("TRACKING", "STOPPED", format!("{} cycles", self.session.cycles)).await;
        tracing::info!(cycles = self.session.cycles, "Tracking loop stopped");
        self
    }
}

async fn upload_fix(uploader: &dyn FixUploader, fix: &Fix, limit: Duration) -> bool {
    let result = match tokio::time::timeout(limit, uploader.upload(fix)).await {
        Ok(result) => result,
        Err(_) => Err(GeotrackError::Upload {
            url: uploader.describe(),
            reason: format!("no response within {:?}", limit),
        }),
    };

    match result {
        Ok(()) => {
            tracing::debug!(server = %uploader.describe(), "Fix uploaded");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "Fix upload failed");
            false
        }
    }
}

struct Worker {
    stop: watch::Sender<bool>,
    handle: JoinHandle<TrackingLoop>,
}

/// Runs a [`TrackingLoop`] on its own task
///
/// Must be used from within a Tokio runtime.
pub struct Tracker {
    state: TrackerState,
    idle: Option<TrackingLoop>,
    worker: Option<Worker>,
}

impl Tracker {
    pub fn new(tracking_loop: TrackingLoop) -> Self {
        Self { state: TrackerState::Stopped, idle: Some(tracking_loop), worker: None }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Begin polling in the background
    pub fn start(&mut self) -> Result<()> {
        if self.state != TrackerState::Stopped {
            return Err(GeotrackError::AlreadyRunning);
        }

        let tracking_loop = self.idle.take().ok_or_else(|| {
            GeotrackError::WorkerFailed("tracking loop was lost by an earlier failure".to_string())
        })?;

        let (stop, receiver) = watch::channel(false);
        let handle = tokio::spawn(tracking_loop.run(receiver));

        self.worker = Some(Worker { stop, handle });
        self.state = TrackerState::Running;
        Ok(())
    }

    /// Stop polling and wait for the current cycle to finish
    ///
    /// Idempotent: stopping a stopped tracker returns immediately.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        self.state = TrackerState::Stopping;
        if worker.stop.send(true).is_err() {
            tracing::debug!("Tracking loop already exited");
        }

        let joined = worker.handle.await;
        self.state = TrackerState::Stopped;

        match joined {
            Ok(tracking_loop) => {
                self.idle = Some(tracking_loop);
                Ok(())
            }
            Err(e) => Err(GeotrackError::WorkerFailed(e.to_string())),
        }
    }

    /// The stopped loop, for inspecting its session
    pub fn tracking_loop(&self) -> Option<&TrackingLoop> {
        self.idle.as_ref()
    }
}
