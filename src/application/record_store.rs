// Store trait for the external dashboard record
use crate::domain::dashboard::RecordId;
use crate::domain::error::DashboardError;
use async_trait::async_trait;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a new record holding `body` and return the identifier the store assigned
    async fn create_record(&self, body: &str) -> Result<RecordId, DashboardError>;

    /// Replace the content of an existing record wholesale.
    /// Fails with `StaleIdentifier` if the store no longer has the record.
    async fn update_record(&self, id: &RecordId, body: &str) -> Result<(), DashboardError>;
}
