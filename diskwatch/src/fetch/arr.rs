//! Sonarr/Radarr disk space source
//!
//! Implements [`DiskSpaceSource`] against the `*arr` v3 API.
//! See: https://sonarr.tv/docs/api/#/DiskSpace

use async_trait::async_trait;
use reqwest::Client;

use super::{DiskSpaceSource, VolumeDescriptor};
use crate::config::ApiConfig;
use crate::error::{FetchError, FetchResult};

/// Header carrying the static API key
const API_KEY_HEADER: &str = "X-Api-Key";

/// `*arr` disk space client
pub struct ArrClient {
    client: Client,
    config: ApiConfig,
}

impl ArrClient {
    pub fn new(config: ApiConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("diskwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Full URL of the disk space endpoint
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}{}",
            self.config.url.trim_end_matches('/'),
            self.config.endpoint
        )
    }
}

#[async_trait]
impl DiskSpaceSource for ArrClient {
    fn name(&self) -> &str {
        "arr"
    }

    async fn volumes(&self) -> FetchResult<Vec<VolumeDescriptor>> {
        let response = self
            .client
            .get(self.endpoint_url())
            .header(API_KEY_HEADER, &self.config.key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        // Read as text first so a bad body reports as a decode error
        let body = response.text().await?;
        let volumes: Vec<VolumeDescriptor> = serde_json::from_str(&body)?;
        Ok(volumes)
    }
}
