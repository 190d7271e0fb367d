use async_trait::async_trait;
use lfb_model::{BuildStatusSnapshot, RawInventoryPayload, Target};

use crate::error::FetchError;

/// Fetches the latest build of one target (`json/builders/<target>/builds/-1`).
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch_latest_build(&self, target: &Target) -> Result<BuildStatusSnapshot, FetchError>;
}

/// Fetches the agent inventory (`json/slaves/`).
#[async_trait]
pub trait InventoryFetcher: Send + Sync {
    async fn fetch_inventory(&self) -> Result<RawInventoryPayload, FetchError>;
}
