//! Scripted in-process backend for unit tests

use crate::search::client::{
    BulkItemFailure, BulkSummary, ClusterHealth, ClusterStatus, DeleteOutcome,
    RawSearchResponse, SearchBackend,
};
use crate::search::document::SearchDocument;
use crate::search::error::{SearchError, SearchResult};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockBackend {
    /// `None` means unreachable
    pub status: Mutex<Option<ClusterStatus>>,
    pub health_calls: AtomicUsize,

    pub index_present: AtomicBool,
    pub created: AtomicUsize,
    pub deleted: AtomicUsize,
    pub refreshes: AtomicUsize,

    pub documents: DashMap<String, SearchDocument>,
    pub writes_fail: AtomicBool,
    pub put_refresh: Mutex<Vec<bool>>,

    pub bulk_batches: Mutex<Vec<usize>>,
    pub bulk_rejects: Mutex<HashSet<String>>,
    pub bulk_fails: AtomicBool,

    pub search_fails: AtomicBool,
    pub search_bodies: Mutex<Vec<Value>>,
    pub completion_response: Mutex<RawSearchResponse>,
    pub query_response: Mutex<RawSearchResponse>,
}

impl MockBackend {
    pub fn healthy() -> Self {
        let backend = Self::default();
        backend.set_status(Some(ClusterStatus::Green));
        backend
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn set_status(&self, status: Option<ClusterStatus>) {
        *self.status.lock().unwrap() = status;
    }

    pub fn respond_with(&self, completion: Value, query: Value) {
        *self.completion_response.lock().unwrap() = serde_json::from_value(completion).unwrap();
        *self.query_response.lock().unwrap() = serde_json::from_value(query).unwrap();
    }

    pub fn search_count(&self) -> usize {
        self.search_bodies.lock().unwrap().len()
    }

    fn unavailable() -> SearchError {
        SearchError::BackendUnavailable("connection refused".to_string())
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn cluster_health(&self) -> SearchResult<ClusterHealth> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        match *self.status.lock().unwrap() {
            Some(status) => Ok(ClusterHealth { status }),
            None => Err(Self::unavailable()),
        }
    }

    async fn index_exists(&self, _index: &str) -> SearchResult<bool> {
        Ok(self.index_present.load(Ordering::SeqCst))
    }

    async fn create_index(&self, _index: &str, _body: &Value) -> SearchResult<()> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.index_present.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_index(&self, _index: &str) -> SearchResult<()> {
        if self.index_present.swap(false, Ordering::SeqCst) {
            self.deleted.fetch_add(1, Ordering::SeqCst);
        }
        self.documents.clear();
        Ok(())
    }

    async fn refresh_index(&self, _index: &str) -> SearchResult<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn put_document(
        &self,
        _index: &str,
        document: &SearchDocument,
        refresh: bool,
    ) -> SearchResult<()> {
        if self.writes_fail.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.put_refresh.lock().unwrap().push(refresh);
        self.documents.insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn delete_document(
        &self,
        _index: &str,
        id: &str,
        _refresh: bool,
    ) -> SearchResult<DeleteOutcome> {
        if self.writes_fail.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(match self.documents.remove(id) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    async fn bulk_index(
        &self,
        _index: &str,
        documents: &[SearchDocument],
    ) -> SearchResult<BulkSummary> {
        self.bulk_batches.lock().unwrap().push(documents.len());
        if self.bulk_fails.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }

        let rejects = self.bulk_rejects.lock().unwrap().clone();
        let mut summary = BulkSummary::default();
        for document in documents {
            if rejects.contains(&document.id) {
                summary.failures.push(BulkItemFailure {
                    id: document.id.clone(),
                    reason: "HTTP 400: mapper_parsing_exception".to_string(),
                });
            } else {
                self.documents.insert(document.id.clone(), document.clone());
                summary.succeeded += 1;
            }
        }
        Ok(summary)
    }

    async fn search(&self, _index: &str, body: &Value) -> SearchResult<RawSearchResponse> {
        self.search_bodies.lock().unwrap().push(body.clone());
        if self.search_fails.load(Ordering::SeqCst) {
            return Err(SearchError::Timeout("operation timed out".to_string()));
        }

        let response = if body.get("suggest").is_some() {
            self.completion_response.lock().unwrap().clone()
        } else {
            self.query_response.lock().unwrap().clone()
        };
        Ok(response)
    }
}
