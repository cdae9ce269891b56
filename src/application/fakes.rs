// In-memory collaborators for service tests
use crate::application::feed_source::FeedSource;
use crate::application::record_store::RecordStore;
use crate::domain::dashboard::RecordId;
use crate::domain::error::DashboardError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create(String),
    Update(String, String),
}

/// Record store backed by a map, with optional queued failures.
#[derive(Default)]
pub struct FakeStore {
    records: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<StoreCall>>,
    failures: Mutex<VecDeque<DashboardError>>,
    next_id: Mutex<u32>,
}

impl FakeStore {
    pub fn with_record(id: &str, body: &str) -> Self {
        let store = Self::default();
        store
            .records
            .lock()
            .unwrap()
            .insert(id.to_string(), body.to_string());
        store
    }

    /// Fail the next calls, in order, before behaving normally again.
    pub fn fail_next(&self, errors: Vec<DashboardError>) {
        self.failures.lock().unwrap().extend(errors);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn body_of(&self, id: &str) -> Option<String> {
        self.records.lock().unwrap().get(id).cloned()
    }

    fn take_failure(&self) -> Option<DashboardError> {
        self.failures.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn create_record(&self, body: &str) -> Result<RecordId, DashboardError> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Create(body.to_string()));
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = format!("task_{}", *next_id);
        self.records
            .lock()
            .unwrap()
            .insert(id.clone(), body.to_string());
        Ok(RecordId::parse(Some(&id)).unwrap())
    }

    async fn update_record(&self, id: &RecordId, body: &str) -> Result<(), DashboardError> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Update(id.to_string(), body.to_string()));
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        match self.records.lock().unwrap().get_mut(id.as_str()) {
            Some(existing) => {
                *existing = body.to_string();
                Ok(())
            }
            None => Err(DashboardError::StaleIdentifier(id.to_string())),
        }
    }
}

/// Feed source replaying queued responses; the last one repeats.
pub struct FakeFeed {
    responses: Mutex<VecDeque<Result<Bytes, DashboardError>>>,
    fetches: Mutex<usize>,
}

impl FakeFeed {
    pub fn new(responses: Vec<Result<Bytes, DashboardError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fetches: Mutex::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl FeedSource for FakeFeed {
    async fn fetch(&self) -> Result<Bytes, DashboardError> {
        *self.fetches.lock().unwrap() += 1;
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses
                .front()
                .cloned()
                .unwrap_or_else(|| Err(DashboardError::Transport("no response queued".into())))
        }
    }
}
