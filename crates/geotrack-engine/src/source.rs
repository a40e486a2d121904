//! Positioning-source adapters

pub mod device;
pub mod replay;
pub mod simulator;
pub mod stream;
pub mod tcp;

pub use device::DeviceSource;
pub use replay::ReplaySource;
pub use simulator::SimulatorSource;
pub use tcp::TcpSource;

use geotrack_core::config::{SourceConfig, SourceKind};
use geotrack_core::error::{GeotrackError, Result};
use geotrack_core::models::GeofenceConfig;
use geotrack_core::ports::PositionSource;

/// Open the configured positioning source
///
/// Failure to open is fatal: tracking without an input makes no sense.
pub async fn open_source(
    config: &SourceConfig,
    geofence: &GeofenceConfig,
) -> Result<Box<dyn PositionSource>> {
    let source: Box<dyn PositionSource> = match config.kind {
        SourceKind::Device => {
            let path = config.path.clone().ok_or_else(|| GeotrackError::ConfigMissing {
                key: "source.path".to_string(),
            })?;
            Box::new(DeviceSource::open(path, config.baud_rate, config.read_timeout()).await?)
        }
        SourceKind::Tcp => {
            let address = config.address.clone().ok_or_else(|| GeotrackError::ConfigMissing {
                key: "source.address".to_string(),
            })?;
            Box::new(TcpSource::connect(address, config.read_timeout()).await?)
        }
        SourceKind::Replay => {
            let path = config.path.clone().ok_or_else(|| GeotrackError::ConfigMissing {
                key: "source.path".to_string(),
            })?;
            Box::new(ReplaySource::open(path).await?)
        }
        SourceKind::Simulator => {
            Box::new(SimulatorSource::new(geofence.latitude, geofence.longitude))
        }
    };

    tracing::info!(source = %source.describe(), "Positioning source opened");
    Ok(source)
}
