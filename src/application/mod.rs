// Application layer - Use cases and collaborator seams
pub mod dashboard_reconciler;
pub mod feed_source;
pub mod record_store;
pub mod retry;
pub mod sync_service;

#[cfg(test)]
pub mod fakes;
