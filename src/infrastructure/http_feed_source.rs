// HTTP feed source for the GTFS-Realtime endpoint
use crate::application::feed_source::FeedSource;
use crate::domain::error::DashboardError;
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build feed HTTP client")?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Bytes, DashboardError> {
        tracing::info!("Fetching GTFS-R feed: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DashboardError::Transport(format!("GET {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Transport(format!(
                "GET {} returned status {}",
                self.url, status
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| DashboardError::Transport(format!("reading feed body failed: {}", e)))
    }
}
