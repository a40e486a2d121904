use async_trait::async_trait;

use crate::error::Result;
use crate::models::Fix;

/// Port for forwarding each acquired fix to a remote collector
#[async_trait]
pub trait FixUploader: Send + Sync {
    async fn upload(&self, fix: &Fix) -> Result<()>;

    /// Endpoint description used in logs
    fn describe(&self) -> String;
}
