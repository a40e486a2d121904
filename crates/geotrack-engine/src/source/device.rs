use async_trait::async_trait;
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::ports::PositionSource;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::File;

use super::stream::read_window;

/// Reads a receiver attached as a device node
///
/// The node must already be configured for the receiver's line speed (for
/// example with `stty`). Any readable path works, which makes plain files
/// usable for testing.
pub struct DeviceSource {
    path: PathBuf,
    baud_rate: u32,
    window: Duration,
    file: File,
}

impl DeviceSource {
    pub async fn open(path: PathBuf, baud_rate: u32, window: Duration) -> Result<Self> {
        let file = File::open(&path).await.map_err(|e| {
            GeotrackError::Source(format!("Failed to open {}: {}", path.display(), e))
        })?;

        Ok(Self { path, baud_rate, window, file })
    }
}

#[async_trait]
impl PositionSource for DeviceSource {
    async fn read(&mut self) -> Result<Vec<u8>> {
        let outcome = read_window(&mut self.file, self.window).await.map_err(|e| {
            GeotrackError::Source(format!("Read from {} failed: {}", self.path.display(), e))
        })?;
        Ok(outcome.bytes)
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.path.display(), self.baud_rate)
    }
}
