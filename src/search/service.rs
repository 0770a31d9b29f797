//! High-level search service

use crate::metrics;
use crate::models::Content;
use crate::search::cache::ResultCache;
use crate::search::client::{ElasticsearchClient, SearchBackend};
use crate::search::config::SearchConfig;
use crate::search::error::SearchResult;
use crate::search::fallback::FallbackSearch;
use crate::search::index::{IndexManager, ReindexReport, SearchHealth};
use crate::search::query::{
    build_completion_body, build_prefix_body, build_search_body, merge_first_seen,
    parse_completion_response, parse_prefix_response, parse_search_response, SearchQuery,
    SearchResponse, SuggestItem, SuggestQuery, SuggestResponse,
};
use crate::search::sync::IndexSynchronizer;
use crate::state::ContentStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const PATH_INDEX: &str = "index";
const PATH_FALLBACK: &str = "fallback";
const PATH_CACHE: &str = "cache";
const PATH_EMPTY: &str = "empty";

/// Entry point for search, autocomplete and index maintenance.
///
/// Reads never fail because of the index: when the backend is disconnected
/// or a call errors, the request is answered from the primary store.
pub struct SearchService {
    manager: Arc<IndexManager>,
    synchronizer: IndexSynchronizer,
    cache: ResultCache,
    fallback: FallbackSearch,
    store: Arc<dyn ContentStore>,
    config: SearchConfig,
}

impl SearchService {
    /// Create a service talking to the configured HTTP endpoint
    pub fn new(config: SearchConfig, store: Arc<dyn ContentStore>) -> SearchResult<Self> {
        config.validate()?;
        let backend = Arc::new(ElasticsearchClient::new(&config)?);
        Ok(Self::with_backend(config, backend, store))
    }

    /// Create a service over any backend implementation
    pub fn with_backend(
        config: SearchConfig,
        backend: Arc<dyn SearchBackend>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        let manager = Arc::new(IndexManager::new(backend, config.clone()));

        Self {
            synchronizer: IndexSynchronizer::new(Arc::clone(&manager)),
            cache: ResultCache::from_config(&config),
            fallback: FallbackSearch::new(Arc::clone(&store)),
            manager,
            store,
            config,
        }
    }

    /// Connect, make sure the index exists and populate it when it was just
    /// created. Returns the health monitor handle when one was started.
    pub async fn initialize(&self) -> Option<JoinHandle<()>> {
        if self.manager.connect().await {
            match self.manager.ensure_populated(self.store.as_ref()).await {
                Ok(state) => {
                    tracing::debug!(index = %self.manager.index_name(), state = ?state, "Search index ready");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to prepare search index");
                }
            }
        }

        match self.config.health_check_interval_secs {
            0 => None,
            secs => Some(
                self.manager
                    .spawn_health_monitor(Arc::clone(&self.store), Duration::from_secs(secs)),
            ),
        }
    }

    /// Ranked search with filters, sorting and pagination
    pub async fn search(&self, query: &SearchQuery) -> SearchResponse {
        let started = Instant::now();
        let query = query.normalized();

        if query.q.is_empty() {
            metrics::record_request("search", PATH_EMPTY, 0.0);
            return SearchResponse::empty(&query);
        }

        if let Some(mut cached) = self.cache.get_search(&query).await {
            // Keys fold case and spacing; echo this caller's text
            cached.query = query.q.clone();
            tracing::debug!(query = %query.q, "Search cache hit");
            metrics::record_request("search", PATH_CACHE, started.elapsed().as_secs_f64());
            return cached;
        }

        if self.manager.is_connected() {
            let body = build_search_body(&query);
            match self
                .manager
                .backend()
                .search(self.manager.index_name(), &body)
                .await
            {
                Ok(raw) => {
                    let response =
                        parse_search_response(raw, &query, started.elapsed().as_millis() as u64);
                    self.cache.put_search(&query, response.clone()).await;

                    tracing::debug!(
                        query = %query.q,
                        total = response.total,
                        took_ms = response.took_ms,
                        "Search served from index"
                    );
                    metrics::record_request("search", PATH_INDEX, started.elapsed().as_secs_f64());
                    return response;
                }
                Err(e) => {
                    tracing::warn!(query = %query.q, error = %e, "Index search failed, using fallback");
                    metrics::record_backend_error("search");
                }
            }
        }

        let response = self.fallback.search(&query).await;
        metrics::record_request("search", PATH_FALLBACK, started.elapsed().as_secs_f64());
        response
    }

    /// Autocomplete over title variants
    pub async fn suggest(&self, query: &SuggestQuery) -> SuggestResponse {
        let started = Instant::now();
        let query = query.normalized();

        if query.q.is_empty() {
            metrics::record_request("suggest", PATH_EMPTY, 0.0);
            return SuggestResponse::empty(&query);
        }

        if let Some(mut cached) = self.cache.get_suggest(&query).await {
            cached.query = query.q.clone();
            metrics::record_request("suggest", PATH_CACHE, started.elapsed().as_secs_f64());
            return cached;
        }

        if self.manager.is_connected() {
            match self.suggest_from_index(&query).await {
                Ok(items) => {
                    let response = SuggestResponse::new(
                        items,
                        started.elapsed().as_millis() as u64,
                        query.q.clone(),
                    );
                    self.cache.put_suggest(&query, response.clone()).await;
                    metrics::record_request("suggest", PATH_INDEX, started.elapsed().as_secs_f64());
                    return response;
                }
                Err(e) => {
                    tracing::warn!(query = %query.q, error = %e, "Index suggest failed, using fallback");
                    metrics::record_backend_error("suggest");
                }
            }
        }

        let response = self.fallback.suggest(&query).await;
        metrics::record_request("suggest", PATH_FALLBACK, started.elapsed().as_secs_f64());
        response
    }

    /// Run both retrieval strategies concurrently and merge completion hits first
    async fn suggest_from_index(&self, query: &SuggestQuery) -> SearchResult<Vec<SuggestItem>> {
        let (completion, prefix) =
            tokio::join!(self.completion_items(query), self.prefix_items(query));

        Ok(merge_first_seen(
            [completion?, prefix?],
            |item: &SuggestItem| item.id.clone(),
            query.limit,
        ))
    }

    async fn completion_items(&self, query: &SuggestQuery) -> SearchResult<Vec<SuggestItem>> {
        if !self.config.enable_completion_suggester {
            return Ok(Vec::new());
        }
        let raw = self
            .manager
            .backend()
            .search(self.manager.index_name(), &build_completion_body(query))
            .await?;
        Ok(parse_completion_response(raw, query))
    }

    async fn prefix_items(&self, query: &SuggestQuery) -> SearchResult<Vec<SuggestItem>> {
        if !self.config.enable_prefix_suggester {
            return Ok(Vec::new());
        }
        let raw = self
            .manager
            .backend()
            .search(self.manager.index_name(), &build_prefix_body(query))
            .await?;
        Ok(parse_prefix_response(raw))
    }

    /// Drop and rebuild the index from every published record
    pub async fn reindex_all(&self) -> SearchResult<ReindexReport> {
        let report = self.manager.reindex_all(self.store.as_ref()).await?;
        self.cache.invalidate_all();
        metrics::INDEX_OPERATIONS_TOTAL
            .with_label_values(&["reindex", "success"])
            .inc_by(report.indexed as f64);
        Ok(report)
    }

    pub fn health(&self) -> SearchHealth {
        self.manager.health()
    }

    /// Push a created or updated record into the index in the background
    pub fn index_document(&self, content: &Content) -> JoinHandle<()> {
        self.synchronizer.index_document(content)
    }

    /// Remove a deleted record from the index in the background
    pub fn remove_document(&self, id: &str) -> JoinHandle<()> {
        self.synchronizer.remove_document(id)
    }

    pub fn index_manager(&self) -> &Arc<IndexManager> {
        &self.manager
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentStatus, ContentType};
    use crate::search::client::ClusterStatus;
    use crate::search::config::SearchConfigBuilder;
    use crate::search::mock::MockBackend;
    use crate::state::InMemoryStore;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn published(id: &str, title: &str, rating: Option<f32>) -> Content {
        let mut content = Content::new(id, title, ContentType::Movie);
        content.status = ContentStatus::Published;
        content.rating = rating;
        content
    }

    fn config() -> SearchConfig {
        SearchConfigBuilder::new()
            .connect_retries(1)
            .connect_retry_delay_ms(1)
            .health_check_interval_secs(0)
            .build()
    }

    fn service(backend: Arc<MockBackend>, contents: Vec<Content>) -> SearchService {
        let store = Arc::new(InMemoryStore::from_contents(contents));
        SearchService::with_backend(config(), backend, store)
    }

    fn hit(id: &str, title: &str) -> serde_json::Value {
        json!({ "_id": id, "_score": 1.0, "_source": { "title": title, "status": "published" } })
    }

    fn option(id: &str, text: &str, status: &str) -> serde_json::Value {
        json!({ "text": text, "_id": id, "_source": { "title": text, "status": status } })
    }

    #[tokio::test]
    async fn test_initialize_populates_new_index() {
        let backend = Arc::new(MockBackend::healthy());
        let service = service(
            backend.clone(),
            vec![published("m1", "Desert Sonata", Some(8.5))],
        );

        assert!(service.initialize().await.is_none());
        assert!(service.health().connected);
        assert_eq!(backend.created.load(Ordering::SeqCst), 1);
        assert_eq!(backend.deleted.load(Ordering::SeqCst), 0);
        assert!(backend.documents.contains_key("m1"));
    }

    #[tokio::test]
    async fn test_backend_recovery_populates_new_index() {
        let backend = Arc::new(MockBackend::unreachable());
        let config = SearchConfigBuilder::new()
            .connect_retries(1)
            .health_check_interval_secs(1)
            .build();
        let store = Arc::new(InMemoryStore::from_contents(vec![published(
            "m1",
            "Desert Sonata",
            Some(8.5),
        )]));
        let service = SearchService::with_backend(config, backend.clone(), store);

        let handle = service.initialize().await.unwrap();
        assert!(!service.health().connected);
        backend.set_status(Some(ClusterStatus::Green));

        let mut populated = false;
        for _ in 0..60 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if service.health().connected && backend.documents.contains_key("m1") {
                populated = true;
                break;
            }
        }
        handle.abort();

        assert!(populated);
        assert_eq!(backend.created.load(Ordering::SeqCst), 1);
        assert_eq!(*backend.bulk_batches.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_index() {
        let backend = Arc::new(MockBackend::healthy());
        backend.index_present.store(true, Ordering::SeqCst);
        let service = service(backend.clone(), vec![published("m1", "Desert Sonata", None)]);

        service.initialize().await;
        assert_eq!(backend.created.load(Ordering::SeqCst), 0);
        assert!(backend.bulk_batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_short_circuits() {
        let backend = Arc::new(MockBackend::healthy());
        let service = service(backend.clone(), vec![]);
        service.initialize().await;

        let response = service.search(&SearchQuery::new("   ")).await;
        assert!(response.items.is_empty());
        assert_eq!(response.total, 0);
        assert_eq!(response.total_pages, 0);

        let suggest = service.suggest(&SuggestQuery::new("")).await;
        assert!(suggest.items.is_empty());
        assert_eq!(backend.search_count(), 0);
    }

    #[tokio::test]
    async fn test_search_served_from_index_then_cache() {
        let backend = Arc::new(MockBackend::healthy());
        backend.respond_with(
            json!({}),
            json!({ "hits": { "total": { "value": 1 }, "hits": [hit("m1", "Desert Sonata")] } }),
        );
        let service = service(backend.clone(), vec![]);
        service.initialize().await;

        let first = service.search(&SearchQuery::new("desret sonata")).await;
        assert_eq!(first.items[0].id, "m1");
        assert_eq!(backend.search_count(), 1);

        let second = service.search(&SearchQuery::new("  Desret Sonata ")).await;
        assert_eq!(second.items, first.items);
        assert_eq!(second.query, "Desret Sonata");
        assert_eq!(first.query, "desret sonata");
        assert_eq!(backend.search_count(), 1);
    }

    #[tokio::test]
    async fn test_search_falls_back_on_error() {
        let backend = Arc::new(MockBackend::healthy());
        let service = service(
            backend.clone(),
            vec![
                published("m1", "Desert Sonata", Some(8.5)),
                published("m2", "Desert Wind", Some(9.0)),
            ],
        );
        service.initialize().await;
        backend.search_fails.store(true, Ordering::SeqCst);

        let response = service.search(&SearchQuery::new("desert")).await;
        let ids: Vec<&str> = response.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);

        // Fallback results are not cached
        backend.search_fails.store(false, Ordering::SeqCst);
        service.search(&SearchQuery::new("desert")).await;
        assert_eq!(backend.search_count(), 2);
    }

    #[tokio::test]
    async fn test_disconnected_uses_fallback_without_backend() {
        let backend = Arc::new(MockBackend::unreachable());
        let service = service(backend.clone(), vec![published("m1", "Desert Sonata", Some(8.5))]);
        service.initialize().await;

        assert!(!service.health().connected);
        let response = service.suggest(&SuggestQuery::new("des")).await;
        assert_eq!(response.items[0].id, "m1");
        assert_eq!(backend.search_count(), 0);
        assert!(matches!(
            service.reindex_all().await,
            Err(crate::search::error::SearchError::BackendUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_suggest_merges_without_duplicates() {
        let backend = Arc::new(MockBackend::healthy());
        backend.respond_with(
            json!({ "suggest": { "title_suggest": [{ "options": [
                option("m1", "Desert Sonata", "published"),
                option("m9", "Desert Draft", "draft"),
                option("m2", "Desert Wind", "published")
            ]}]}}),
            json!({ "hits": { "hits": [
                hit("m2", "Desert Wind"),
                hit("m3", "Deserted"),
                hit("m4", "Desolation")
            ]}}),
        );
        let service = service(backend.clone(), vec![]);
        service.initialize().await;

        let response = service.suggest(&SuggestQuery::new("Des").with_limit(3)).await;
        let ids: Vec<&str> = response.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_eq!(response.total, 3);
        assert_eq!(response.items[0].highlight.as_deref(), Some("<mark>Des</mark>ert Sonata"));
        assert_eq!(backend.search_count(), 2);

        let cached = service.suggest(&SuggestQuery::new("DES").with_limit(3)).await;
        assert_eq!(cached.items, response.items);
        assert_eq!(cached.query, "DES");
        assert_eq!(backend.search_count(), 2);
    }

    #[tokio::test]
    async fn test_suggest_strategy_toggle() {
        let backend = Arc::new(MockBackend::healthy());
        let store = Arc::new(InMemoryStore::new());
        let config = SearchConfigBuilder::new()
            .connect_retries(1)
            .health_check_interval_secs(0)
            .suggest_strategies(false, true)
            .build();
        let service = SearchService::with_backend(config, backend.clone(), store);
        service.initialize().await;

        service.suggest(&SuggestQuery::new("des")).await;
        let bodies = backend.search_bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].get("suggest").is_none());
    }

    #[tokio::test]
    async fn test_removed_document_not_returned_by_fallback() {
        let backend = Arc::new(MockBackend::healthy());
        let store = Arc::new(InMemoryStore::from_contents(vec![published(
            "m1",
            "Desert Sonata",
            Some(8.5),
        )]));
        let service = SearchService::with_backend(config(), backend.clone(), store.clone());
        service.initialize().await;

        store.delete_content("m1").unwrap();
        service.remove_document("m1").await.unwrap();
        assert!(!backend.documents.contains_key("m1"));

        backend.set_status(Some(ClusterStatus::Red));
        service.index_manager().check_health().await;
        let response = service.search(&SearchQuery::new("desert")).await;
        assert!(response.items.is_empty());
    }
}
