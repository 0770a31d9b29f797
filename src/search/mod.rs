//! Catalog search backed by an Elasticsearch-compatible index
//!
//! This module keeps a denormalized copy of published catalog content in a
//! remote full-text index and serves two read APIs from it:
//!
//! - **Search**: ranked, fuzzy, multi-field queries with filters, sorting,
//!   pagination and highlighted fragments
//! - **Suggest**: low-latency autocomplete merging a completion suggester
//!   with an edge-n-gram prefix query
//!
//! Writes are pushed in fire-and-forget from the surrounding CRUD layer.
//! When the index is unreachable every read is answered from the primary
//! store instead, with the same response shape.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │           Search Service API                    │
//! ├─────────────────────────────────────────────────┤
//! │  - search()          - suggest()                │
//! │  - index_document()  - remove_document()        │
//! │  - reindex_all()     - health()                 │
//! └─────────────────────────────────────────────────┘
//!          │                 │                │
//!          ▼                 ▼                ▼
//! ┌────────────────┐ ┌───────────────┐ ┌──────────────┐
//! │ Result Cache   │ │ Index Manager │ │ Fallback     │
//! │ (moka, TTL)    │ │ + Synchronizer│ │ (ContentStore)│
//! └────────────────┘ └───────────────┘ └──────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────┐
//! │     SearchBackend (Elasticsearch over HTTP)     │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use catalog_search::search::{SearchConfig, SearchQuery, SearchService, SuggestQuery};
//! use catalog_search::state::InMemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryStore::new());
//!     let search = SearchService::new(SearchConfig::default(), store)?;
//!     search.initialize().await;
//!
//!     let results = search.search(&SearchQuery::new("desert sonata").with_limit(10)).await;
//!     println!("Found {} titles", results.total);
//!
//!     let suggestions = search.suggest(&SuggestQuery::new("des")).await;
//!     println!("{} suggestions", suggestions.total);
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod client;
mod cache;
mod config;
pub mod document;
mod error;
mod fallback;
mod index;
pub mod query;
pub mod schema;
mod service;
mod sync;

#[cfg(test)]
mod mock;

pub use cache::ResultCache;
pub use client::{ElasticsearchClient, SearchBackend};
pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{to_document, SearchDocument};
pub use error::{SearchError, SearchResult};
pub use fallback::FallbackSearch;
pub use index::{IndexManager, IndexState, ReindexReport, SearchHealth};
pub use query::{
    SearchItem, SearchQuery, SearchResponse, SearchSort, SuggestItem, SuggestQuery,
    SuggestResponse,
};
pub use service::SearchService;
pub use sync::IndexSynchronizer;
