//! Fire-and-forget propagation of content mutations into the index

use crate::metrics;
use crate::models::Content;
use crate::search::client::DeleteOutcome;
use crate::search::index::{indexable_document, IndexManager};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Pushes single-document writes to the index without blocking the caller.
///
/// Failures are logged and counted, never returned: the primary store is the
/// source of truth and the next full reindex repairs any drift.
#[derive(Clone)]
pub struct IndexSynchronizer {
    manager: Arc<IndexManager>,
}

impl IndexSynchronizer {
    pub fn new(manager: Arc<IndexManager>) -> Self {
        Self { manager }
    }

    /// Create or replace the document for `content`
    pub fn index_document(&self, content: &Content) -> JoinHandle<()> {
        if !self.manager.is_connected() {
            tracing::debug!(content_id = %content.id, "Search backend disconnected, skipping index");
            return tokio::spawn(async {});
        }

        let document = match indexable_document(content) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(error = %e, "Content cannot be indexed");
                metrics::record_index_operation("index", false);
                return tokio::spawn(async {});
            }
        };
        let manager = Arc::clone(&self.manager);

        tokio::spawn(async move {
            let refresh = manager.config().refresh_on_write;
            match manager
                .backend()
                .put_document(manager.index_name(), &document, refresh)
                .await
            {
                Ok(()) => {
                    tracing::debug!(content_id = %document.id, "Indexed content");
                    metrics::record_index_operation("index", true);
                }
                Err(e) => {
                    tracing::error!(content_id = %document.id, error = %e, "Failed to index content");
                    metrics::record_index_operation("index", false);
                }
            }
        })
    }

    /// Remove the document for `id`; a missing document counts as success
    pub fn remove_document(&self, id: &str) -> JoinHandle<()> {
        if !self.manager.is_connected() {
            tracing::debug!(content_id = %id, "Search backend disconnected, skipping removal");
            return tokio::spawn(async {});
        }

        let id = id.to_string();
        let manager = Arc::clone(&self.manager);

        tokio::spawn(async move {
            let refresh = manager.config().refresh_on_write;
            match manager
                .backend()
                .delete_document(manager.index_name(), &id, refresh)
                .await
            {
                Ok(DeleteOutcome::Deleted) => {
                    tracing::debug!(content_id = %id, "Removed content from index");
                    metrics::record_index_operation("remove", true);
                }
                Ok(DeleteOutcome::NotFound) => {
                    tracing::debug!(content_id = %id, "Content was not indexed");
                    metrics::record_index_operation("remove", true);
                }
                Err(e) => {
                    tracing::error!(content_id = %id, error = %e, "Failed to remove content");
                    metrics::record_index_operation("remove", false);
                }
            }
        })
    }
}
