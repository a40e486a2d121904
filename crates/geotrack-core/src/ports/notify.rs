use async_trait::async_trait;

use crate::error::Result;

/// Port for delivering alert text to a destination
///
/// The destination format is transport-specific (a phone number for an SMS
/// gateway, an address for a mail relay). Only success or failure is
/// reported back.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `text` to `destination`
    async fn send(&self, destination: &str, text: &str) -> Result<()>;

    /// Name of the transport, used in logs
    fn name(&self) -> &str;
}
