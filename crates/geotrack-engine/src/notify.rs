//! Notifier adapters

pub mod log;
pub mod webhook;

pub use self::log::LogNotifier;
pub use self::webhook::WebhookNotifier;

use geotrack_core::config::{NotificationConfig, NotifierKind};
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::ports::Notifier;
use std::sync::Arc;

/// Build the configured notification transport
pub fn build_notifier(config: &NotificationConfig, subject_id: &str) -> Result<Arc<dyn Notifier>> {
    match config.kind {
        NotifierKind::Log => Ok(Arc::new(LogNotifier::new())),
        NotifierKind::Webhook => {
            let url = config.webhook_url.clone().ok_or_else(|| GeotrackError::ConfigMissing {
                key: "notification.webhook_url".to_string(),
            })?;
            Ok(Arc::new(WebhookNotifier::new(url, subject_id, config.send_timeout())?))
        }
    }
}
