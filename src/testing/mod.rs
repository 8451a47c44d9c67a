use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::api::TaskRequest;
use crate::database::{MemoryTaskStore, NewTask, StoreError, StoreResult, Task, TaskChanges, TaskStore};
use crate::types::TaskMethod;

/// Passes the shape check; carries no verifiable signature
pub const SHAPED_TOKEN: &str = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJ0ZXN0In0.c2ln";

/// Memory store that counts every call and can be told to fail them all
pub struct RecordingStore {
    inner: MemoryTaskStore,
    calls: AtomicUsize,
    failure: Option<fn() -> StoreError>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryTaskStore::new(),
            calls: AtomicUsize::new(0),
            failure: None,
        }
    }

    pub fn failing(failure: fn() -> StoreError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskStore for RecordingStore {
    async fn select(&self, limit: i64) -> StoreResult<Vec<Task>> {
        self.record()?;
        self.inner.select(limit).await
    }

    async fn insert(&self, record: NewTask) -> StoreResult<Task> {
        self.record()?;
        self.inner.insert(record).await
    }

    async fn update(&self, id: i64, changes: TaskChanges) -> StoreResult<Task> {
        self.record()?;
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        self.record()?;
        self.inner.delete(id).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("valid header value"),
    );
    headers
}

/// Request carrying a well-shaped bearer token
pub fn authed(method: TaskMethod, body: Value) -> TaskRequest {
    TaskRequest::new(method, bearer_headers(SHAPED_TOKEN), body)
}

pub fn anonymous(method: TaskMethod, body: Value) -> TaskRequest {
    TaskRequest::new(method, HeaderMap::new(), body)
}
