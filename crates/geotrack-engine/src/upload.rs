//! Forwarding fixes to a collection server

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geotrack_core::config::UploadConfig;
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::models::Fix;
use geotrack_core::ports::FixUploader;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// POSTs each fix as JSON to a collection endpoint
pub struct HttpUploader {
    url: String,
    subject_id: String,
    client: reqwest::Client,
}

impl HttpUploader {
    pub fn new(url: impl Into<String>, subject_id: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            GeotrackError::ConfigInvalid {
                key: "upload.server_url".to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            }
        })?;

        Ok(Self { url: url.into(), subject_id: subject_id.into(), client })
    }
}

#[async_trait]
impl FixUploader for HttpUploader {
    async fn upload(&self, fix: &Fix) -> Result<()> {
        let payload = UploadPayload {
            subject_id: &self.subject_id,
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: fix.altitude,
            timestamp: fix.captured_at,
            speed: fix.speed,
        };

        let response = self.client.post(&self.url).json(&payload).send().await.map_err(|e| {
            GeotrackError::Upload { url: self.url.clone(), reason: e.to_string() }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeotrackError::Upload {
                url: self.url.clone(),
                reason: format!("server answered {}", status),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[derive(Debug, Serialize)]
struct UploadPayload<'a> {
    subject_id: &'a str,
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
    timestamp: DateTime<Utc>,
    speed: Option<f64>,
}

/// Build the uploader, or `None` when no server is configured
pub fn build_uploader(config: &UploadConfig, subject_id: &str) -> Result<Option<Arc<dyn FixUploader>>> {
    match &config.server_url {
        Some(url) => Ok(Some(Arc::new(HttpUploader::new(url.clone(), subject_id, config.timeout())?))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::one_shot_server;

    fn sample_fix() -> Fix {
        Fix::new(40.7128, -74.006, Utc::now()).unwrap().with_altitude(12.5).with_speed(1.5)
    }

    #[tokio::test]
    async fn test_posts_fix_as_json() {
        let (url, server) = one_shot_server("/api/location", "HTTP/1.1 200 OK").await;
        let uploader = HttpUploader::new(url, "PATIENT001", Duration::from_secs(5)).unwrap();

        uploader.upload(&sample_fix()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/location"));
        assert!(request.contains(r#""subject_id":"PATIENT001""#));
        assert!(request.contains(r#""latitude":40.7128"#));
        assert!(request.contains(r#""altitude":12.5"#));
        assert!(request.contains(r#""timestamp":""#));
    }

    #[tokio::test]
    async fn test_server_error_is_upload_failure() {
        let (url, server) = one_shot_server("/api/location", "HTTP/1.1 500 Internal Server Error").await;
        let uploader = HttpUploader::new(url, "PATIENT001", Duration::from_secs(5)).unwrap();

        let err = uploader.upload(&sample_fix()).await.unwrap_err();
        assert!(matches!(err, GeotrackError::Upload { .. }));
        assert!(err.is_transient());
        server.await.unwrap();
    }

    #[test]
    fn test_upload_disabled_without_server() {
        assert!(build_uploader(&UploadConfig::default(), "PATIENT001").unwrap().is_none());

        let config = UploadConfig {
            server_url: Some("http://127.0.0.1:9/api/location".into()),
            ..UploadConfig::default()
        };
        let uploader = build_uploader(&config, "PATIENT001").unwrap().unwrap();
        assert_eq!(uploader.describe(), "http://127.0.0.1:9/api/location");
    }
}
