use async_trait::async_trait;
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::ports::Notifier;
use serde::Serialize;
use std::time::Duration;

/// Posts alerts to an HTTP SMS gateway
pub struct WebhookNotifier {
    /// Gateway endpoint
    url: String,

    /// Subject the alerts concern
    subject_id: String,

    /// HTTP client with the send timeout applied
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, subject_id: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            GeotrackError::ConfigInvalid {
                key: "notification.webhook_url".to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            }
        })?;

        Ok(Self { url: url.into(), subject_id: subject_id.into(), client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, destination: &str, text: &str) -> Result<()> {
        let request = WebhookRequest { destination, text, subject_id: &self.subject_id };

        let response = self.client.post(&self.url).json(&request).send().await.map_err(|e| {
            GeotrackError::Notification {
                destination: destination.to_string(),
                reason: format!("Failed to reach gateway {}: {}", self.url, e),
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeotrackError::Notification {
                destination: destination.to_string(),
                reason: format!("Gateway error ({}): {}", status, body),
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

/// Request body posted to the gateway
#[derive(Debug, Serialize)]
struct WebhookRequest<'a> {
    destination: &'a str,
    text: &'a str,
    subject_id: &'a str,
}
