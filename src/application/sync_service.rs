// Sync service - One fetch, decode and reconcile cycle
use crate::application::dashboard_reconciler::DashboardReconciler;
use crate::application::feed_source::FeedSource;
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::dashboard::{render_body, ReconcileAction, ReconcileOutcome, RecordId};
use crate::domain::error::DashboardError;
use crate::domain::vehicle::FeedSnapshot;
use crate::infrastructure::gtfs_decoder;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub identifier: RecordId,
    pub action: ReconcileAction,
    pub vehicle_count: usize,
    /// True when the stored identifier was stale and a new record replaced it.
    pub recovered_from_stale: bool,
}

#[derive(Clone)]
pub struct SyncService {
    feed: Arc<dyn FeedSource>,
    reconciler: DashboardReconciler,
    retry: RetryPolicy,
    recreate_on_stale: bool,
}

impl SyncService {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        reconciler: DashboardReconciler,
        retry: RetryPolicy,
        recreate_on_stale: bool,
    ) -> Self {
        Self {
            feed,
            reconciler,
            retry,
            recreate_on_stale,
        }
    }

    pub async fn run_cycle(&self, existing: Option<RecordId>) -> Result<CycleReport, DashboardError> {
        let snapshot = self.fetch_snapshot().await?;
        let vehicle_count = snapshot.vehicle_count();

        let first = self.reconcile_with_retry(&snapshot, existing.as_ref()).await;
        let (outcome, recovered_from_stale) = match first {
            Ok(outcome) => (outcome, false),
            Err(DashboardError::StaleIdentifier(stale)) if self.recreate_on_stale => {
                tracing::warn!(
                    record_id = %stale,
                    "Stored dashboard record no longer exists, creating a replacement"
                );
                (self.reconcile_with_retry(&snapshot, None).await?, true)
            }
            Err(err) => return Err(err),
        };

        Ok(CycleReport {
            identifier: outcome.identifier,
            action: outcome.action,
            vehicle_count,
            recovered_from_stale,
        })
    }

    /// Fetch and render without touching the store.
    pub async fn preview(&self) -> Result<String, DashboardError> {
        let snapshot = self.fetch_snapshot().await?;
        Ok(render_body(&snapshot, self.reconciler.settings()))
    }

    async fn fetch_snapshot(&self) -> Result<FeedSnapshot, DashboardError> {
        let raw = with_retry(&self.retry, "fetch_feed", || self.feed.fetch()).await?;
        tracing::info!("Fetched {} bytes of feed data", raw.len());
        gtfs_decoder::decode(&raw, Utc::now())
    }

    /// Updates overwrite the same record and are retried on transient errors.
    /// A create gets a single attempt: a timed-out create may still have
    /// landed, and retrying it could leave an orphaned duplicate record.
    async fn reconcile_with_retry(
        &self,
        snapshot: &FeedSnapshot,
        existing: Option<&RecordId>,
    ) -> Result<ReconcileOutcome, DashboardError> {
        let single_attempt = RetryPolicy::new(1, Duration::ZERO, 1.0);
        let policy = if existing.is_some() {
            &self.retry
        } else {
            &single_attempt
        };
        with_retry(policy, "reconcile", || {
            self.reconciler.reconcile(snapshot, existing)
        })
        .await
    }
}
