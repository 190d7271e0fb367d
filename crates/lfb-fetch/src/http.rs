use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::trace;

use lfb_core::{CoreError, FetchError, InventoryFetcher, StatusFetcher};
use lfb_model::{BuildStatusSnapshot, RawBuild, RawInventoryPayload, Target};

use crate::config::FetcherConfig;

/// Client for the CI server's `json/` status API.
///
/// No request timeout is set beyond the transport default.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    root: String,
}

impl HttpFetcher {
    pub fn new(cfg: &FetcherConfig) -> Result<Self, CoreError> {
        Self::with_client(cfg, reqwest::Client::new())
    }

    pub fn with_client(cfg: &FetcherConfig, client: reqwest::Client) -> Result<Self, CoreError> {
        cfg.validate()?;
        Ok(Self {
            client,
            root: cfg.root().to_string(),
        })
    }

    pub fn build_url(&self, target: &Target) -> String {
        format!("{}/json/builders/{}/builds/-1", self.root, target)
    }

    pub fn inventory_url(&self) -> String {
        format!("{}/json/slaves/", self.root)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        trace!(%url, "GET");
        let response = self.client.get(&url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|e| {
            FetchError::InvalidResponse(format!("failed to parse response: {e}, body: {body}"))
        })
    }
}

fn transport(e: reqwest::Error) -> FetchError {
    FetchError::Transport(e.to_string())
}

#[async_trait]
impl StatusFetcher for HttpFetcher {
    async fn fetch_latest_build(&self, target: &Target) -> Result<BuildStatusSnapshot, FetchError> {
        let raw: RawBuild = self.get_json(self.build_url(target)).await?;
        BuildStatusSnapshot::try_from(raw).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl InventoryFetcher for HttpFetcher {
    async fn fetch_inventory(&self) -> Result<RawInventoryPayload, FetchError> {
        self.get_json(self.inventory_url()).await
    }
}
