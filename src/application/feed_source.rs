// Transport trait for raw feed bytes
use crate::domain::error::DashboardError;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch a fresh copy of the feed. Network problems surface as `Transport`.
    async fn fetch(&self) -> Result<Bytes, DashboardError>;
}
