//! GeoTrack Engine - Alerting and the tracking loop
//!
//! This crate wires the decoder, geofence evaluator and location store into
//! the background tracking loop, and provides the positioning-source,
//! notifier and upload adapters it runs against.

pub mod alert;
pub mod notify;
pub mod session;
pub mod source;
pub mod tracker;
pub mod upload;

#[cfg(test)]
mod testing;

pub use alert::{AlertManager, AlertState};
pub use notify::{build_notifier, LogNotifier, WebhookNotifier};
pub use session::{CycleReport, TrackerState, TrackingSession};
pub use source::open_source;
pub use tracker::{Tracker, TrackerConfig, TrackingLoop};
pub use upload::{build_uploader, HttpUploader};
