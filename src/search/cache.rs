//! Read-through result caches for search and suggest

use crate::search::analysis::normalize;
use crate::search::config::SearchConfig;
use crate::search::query::{SearchQuery, SearchResponse, SuggestQuery, SuggestResponse};
use moka::future::Cache;
use std::time::Duration;

/// TTL-bounded caches keyed by normalized request parameters.
///
/// There is no invalidation on content mutation; staleness is bounded by
/// the TTLs alone.
#[derive(Clone)]
pub struct ResultCache {
    search: Cache<String, SearchResponse>,
    suggest: Cache<String, SuggestResponse>,
}

impl ResultCache {
    pub fn new(capacity: u64, search_ttl: Duration, suggest_ttl: Duration) -> Self {
        Self {
            search: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(search_ttl)
                .build(),
            suggest: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(suggest_ttl)
                .build(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            config.cache_capacity,
            Duration::from_secs(config.search_cache_ttl_secs),
            Duration::from_secs(config.suggest_cache_ttl_secs),
        )
    }

    pub async fn get_search(&self, query: &SearchQuery) -> Option<SearchResponse> {
        self.search.get(&search_key(query)).await
    }

    pub async fn put_search(&self, query: &SearchQuery, response: SearchResponse) {
        self.search.insert(search_key(query), response).await;
    }

    pub async fn get_suggest(&self, query: &SuggestQuery) -> Option<SuggestResponse> {
        self.suggest.get(&suggest_key(query)).await
    }

    pub async fn put_suggest(&self, query: &SuggestQuery, response: SuggestResponse) {
        self.suggest.insert(suggest_key(query), response).await;
    }

    pub fn invalidate_all(&self) {
        self.search.invalidate_all();
        self.suggest.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.search.entry_count() + self.suggest.entry_count()
    }
}

/// Stable key over every search parameter; `q` is folded so that spelling
/// variants the index treats alike share an entry
pub fn search_key(query: &SearchQuery) -> String {
    let key = SearchQuery {
        q: normalize(&query.q),
        genre: query.genre.as_deref().map(normalize),
        country: query.country.as_deref().map(normalize),
        ..query.clone()
    };
    format!("search:{}", serde_json::to_string(&key).unwrap_or_default())
}

pub fn suggest_key(query: &SuggestQuery) -> String {
    format!("suggest:{}:{}", query.limit, normalize(&query.q))
}
