use async_trait::async_trait;
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::ports::PositionSource;
use std::time::Duration;
use tokio::net::TcpStream;

use super::stream::read_window;

/// Bound on a single connection attempt
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Reads raw NMEA from a TCP endpoint (ser2net, gpsd raw mode)
///
/// A dropped connection is reported once as a source failure and
/// re-established on the next read.
pub struct TcpSource {
    address: String,
    window: Duration,
    stream: Option<TcpStream>,
}

impl TcpSource {
    /// Connect to `address`; the first connection must succeed
    pub async fn connect(address: String, window: Duration) -> Result<Self> {
        let stream = dial(&address).await?;
        Ok(Self { address, window, stream: Some(stream) })
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

async fn dial(address: &str) -> Result<TcpStream> {
    tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(address))
        .await
        .map_err(|_| GeotrackError::SourceTimeout(CONNECT_TIMEOUT))?
        .map_err(|e| GeotrackError::Source(format!("Failed to connect to {}: {}", address, e)))
}

#[async_trait]
impl PositionSource for TcpSource {
    async fn read(&mut self) -> Result<Vec<u8>> {
        if self.stream.is_none() {
            let stream = dial(&self.address).await?;
            tracing::info!(address = %self.address, "Reconnected to positioning source");
            self.stream = Some(stream);
        }

        let Some(stream) = self.stream.as_mut() else {
            return Err(GeotrackError::Source(format!("Not connected to {}", self.address)));
        };

        match read_window(stream, self.window).await {
            Ok(outcome) if outcome.eof => {
                self.stream = None;
                if outcome.bytes.is_empty() {
                    return Err(GeotrackError::Source(format!(
                        "Connection to {} closed",
                        self.address
                    )));
                }
                Ok(outcome.bytes)
            }
            Ok(outcome) => Ok(outcome.bytes),
            Err(e) => {
                self.stream = None;
                Err(GeotrackError::Source(format!("Read from {} failed: {}", self.address, e)))
            }
        }
    }

    fn describe(&self) -> String {
        format!("tcp://{}", self.address)
    }
}
