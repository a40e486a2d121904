use async_trait::async_trait;
use geotrack_core::error::Result;
use geotrack_core::ports::Notifier;

/// Writes alerts to the log stream; always succeeds
///
/// Used when no gateway is configured so alerts stay visible to the operator.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, destination: &str, text: &str) -> Result<()> {
        tracing::warn!(destination = %destination, "{}", text);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
