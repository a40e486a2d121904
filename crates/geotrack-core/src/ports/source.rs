use async_trait::async_trait;

use crate::error::Result;

/// Port for a raw positioning byte stream
///
/// Implementations must return promptly: an empty buffer means "nothing new
/// since the last read" and is not an error. Transport failures are reported
/// as [`GeotrackError::Source`](crate::GeotrackError::Source) and are treated
/// as transient by the caller.
#[async_trait]
pub trait PositionSource: Send {
    /// Read every byte currently available
    async fn read(&mut self) -> Result<Vec<u8>>;

    /// Human-readable description used in logs (e.g. "/dev/ttyS0")
    fn describe(&self) -> String;
}

#[async_trait]
impl<S: PositionSource + ?Sized> PositionSource for Box<S> {
    async fn read(&mut self) -> Result<Vec<u8>> {
        (**self).read().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
