// Dashboard reconciler - Use case for keeping the single dashboard record current
use crate::application::record_store::RecordStore;
use crate::domain::dashboard::{
    DashboardRecord, DisplaySettings, ReconcileAction, ReconcileOutcome, RecordId,
};
use crate::domain::error::DashboardError;
use crate::domain::vehicle::FeedSnapshot;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardReconciler {
    store: Arc<dyn RecordStore>,
    settings: DisplaySettings,
}

impl DashboardReconciler {
    pub fn new(store: Arc<dyn RecordStore>, settings: DisplaySettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    /// Write the rendered snapshot to exactly one record.
    ///
    /// Without an identifier a record is created; with one, that record (and
    /// only that record) is overwritten. Errors are returned as-is, including
    /// `StaleIdentifier` when the store no longer knows `existing`.
    pub async fn reconcile(
        &self,
        snapshot: &FeedSnapshot,
        existing: Option<&RecordId>,
    ) -> Result<ReconcileOutcome, DashboardError> {
        let record = DashboardRecord::new(existing.cloned(), snapshot, &self.settings);

        match record.identifier {
            None => {
                tracing::info!(
                    vehicles = snapshot.vehicle_count(),
                    "No dashboard record yet, creating one"
                );
                let id = self.store.create_record(&record.rendered_body).await?;
                tracing::info!(record_id = %id, "Created dashboard record");
                Ok(ReconcileOutcome::new(id, ReconcileAction::Created))
            }
            Some(id) => {
                tracing::info!(
                    record_id = %id,
                    vehicles = snapshot.vehicle_count(),
                    "Updating dashboard record"
                );
                self.store.update_record(&id, &record.rendered_body).await?;
                Ok(ReconcileOutcome::new(id, ReconcileAction::Updated))
            }
        }
    }
}
