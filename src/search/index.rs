//! Index lifecycle: connectivity, creation and full rebuilds

use crate::metrics;
use crate::models::Content;
use crate::search::client::SearchBackend;
use crate::search::config::SearchConfig;
use crate::search::document::{to_document, SearchDocument};
use crate::search::error::{SearchError, SearchResult};
use crate::search::schema;
use crate::state::ContentStore;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Whether `ensure_index` found the index or had to create it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Created,
    Existing,
}

/// Outcome of a full rebuild
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReindexReport {
    /// Documents accepted by the backend
    pub indexed: usize,

    /// Records rejected by validation or by the backend
    pub errors: usize,

    pub took_ms: u64,
}

/// Connectivity snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHealth {
    pub connected: bool,
    pub index: String,
}

/// Owns the connectivity flag and the content index lifecycle
pub struct IndexManager {
    backend: Arc<dyn SearchBackend>,
    config: SearchConfig,
    index_name: String,
    connected: AtomicBool,
}

impl IndexManager {
    /// Create a manager; starts out disconnected until `connect` succeeds
    pub fn new(backend: Arc<dyn SearchBackend>, config: SearchConfig) -> Self {
        let index_name = config.index_name();
        Self {
            backend,
            config,
            index_name,
            connected: AtomicBool::new(false),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn set_connected(&self, connected: bool) {
        let previous = self.connected.swap(connected, Ordering::AcqRel);
        metrics::set_backend_connected(connected);

        if previous != connected {
            if connected {
                tracing::info!(index = %self.index_name, "Search backend connected");
            } else {
                tracing::warn!(index = %self.index_name, "Search backend lost, serving from fallback");
            }
        }
    }

    /// Poll cluster health once and update the connectivity flag
    pub async fn check_health(&self) -> bool {
        let healthy = match self.backend.cluster_health().await {
            Ok(health) if health.status.is_available() => true,
            Ok(health) => {
                tracing::warn!(status = ?health.status, "Search cluster is unhealthy");
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, "Search health check failed");
                false
            }
        };

        self.set_connected(healthy);
        healthy
    }

    /// Poll health with bounded retries.
    ///
    /// Never fails: after the last attempt the manager stays in
    /// disconnected mode and reads are served by the fallback path.
    pub async fn connect(&self) -> bool {
        let attempts = self.config.connect_retries.max(1);

        for attempt in 1..=attempts {
            match self.backend.cluster_health().await {
                Ok(health) if health.status.is_available() => {
                    tracing::info!(
                        attempt = attempt,
                        status = ?health.status,
                        "Search cluster is healthy"
                    );
                    self.set_connected(true);
                    return true;
                }
                Ok(health) => {
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = attempts,
                        status = ?health.status,
                        "Search cluster reported unhealthy status"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Search cluster health check failed"
                    );
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.connect_retry_delay()).await;
            }
        }

        tracing::error!(
            endpoint = %self.config.endpoint,
            attempts = attempts,
            "Search backend unreachable, entering disconnected mode"
        );
        self.set_connected(false);
        false
    }

    /// Create the index with the full schema if it does not exist yet
    pub async fn ensure_index(&self) -> SearchResult<IndexState> {
        if self.backend.index_exists(&self.index_name).await? {
            return Ok(IndexState::Existing);
        }

        let body = schema::index_body(self.config.number_of_replicas);
        self.backend.create_index(&self.index_name, &body).await?;
        tracing::info!(index = %self.index_name, "Created search index");
        Ok(IndexState::Created)
    }

    /// Drop the index and rebuild it from every published record
    pub async fn reindex_all(&self, store: &dyn ContentStore) -> SearchResult<ReindexReport> {
        if !self.is_connected() {
            return Err(SearchError::BackendUnavailable(
                "search backend is not connected".to_string(),
            ));
        }

        tracing::info!(index = %self.index_name, "Starting full reindex");
        self.backend.delete_index(&self.index_name).await?;
        self.ensure_index().await?;
        self.populate(store).await
    }

    /// Bulk-load every published record into the existing index, then
    /// refresh once. Does not drop anything.
    pub async fn populate(&self, store: &dyn ContentStore) -> SearchResult<ReindexReport> {
        let started = Instant::now();
        let contents = store.list_published().await?;
        let batch_size = self.config.reindex_batch_size.max(1);
        let mut report = ReindexReport::default();

        for (batch, chunk) in contents.chunks(batch_size).enumerate() {
            let mut documents: Vec<SearchDocument> = Vec::with_capacity(chunk.len());
            for content in chunk {
                match indexable_document(content) {
                    Ok(document) => documents.push(document),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping invalid content");
                        report.errors += 1;
                    }
                }
            }
            if documents.is_empty() {
                continue;
            }

            match self.backend.bulk_index(&self.index_name, &documents).await {
                Ok(summary) => {
                    report.indexed += summary.succeeded;
                    for failure in &summary.failures {
                        tracing::warn!(
                            content_id = %failure.id,
                            reason = %failure.reason,
                            "Backend rejected document"
                        );
                    }
                    report.errors += summary.failures.len();
                }
                Err(e) => {
                    tracing::error!(
                        batch = batch,
                        documents = documents.len(),
                        error = %e,
                        "Bulk request failed"
                    );
                    metrics::record_backend_error("reindex");
                    report.errors += documents.len();
                }
            }
        }

        if let Err(e) = self.backend.refresh_index(&self.index_name).await {
            tracing::warn!(index = %self.index_name, error = %e, "Refresh after bulk load failed");
        }

        report.took_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            index = %self.index_name,
            indexed = report.indexed,
            errors = report.errors,
            took_ms = report.took_ms,
            "Bulk load completed"
        );
        Ok(report)
    }

    /// Ensure the index exists and fill it when it had to be created
    pub async fn ensure_populated(&self, store: &dyn ContentStore) -> SearchResult<IndexState> {
        let state = self.ensure_index().await?;
        if state == IndexState::Created {
            tracing::info!(index = %self.index_name, "Index was created, populating from primary store");
            self.populate(store).await?;
        }
        Ok(state)
    }

    pub fn health(&self) -> SearchHealth {
        SearchHealth {
            connected: self.is_connected(),
            index: self.index_name.clone(),
        }
    }

    /// Re-check health on an interval. After a recovery the index is
    /// ensured and, when it had to be created, filled from `store`.
    pub fn spawn_health_monitor(
        self: &Arc<Self>,
        store: Arc<dyn ContentStore>,
        interval: Duration,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick fires immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let was_connected = manager.is_connected();
                let healthy = manager.check_health().await;
                if healthy && !was_connected {
                    if let Err(e) = manager.ensure_populated(store.as_ref()).await {
                        tracing::error!(error = %e, "Failed to prepare index after reconnect");
                    }
                }
            }
        })
    }
}

/// Validate a record and map it to its search document
pub(crate) fn indexable_document(content: &Content) -> SearchResult<SearchDocument> {
    content
        .validate_for_index()
        .map_err(|e| SearchError::InvalidDocument {
            id: content.id.clone(),
            reason: e.to_string(),
        })?;
    Ok(to_document(content))
}
