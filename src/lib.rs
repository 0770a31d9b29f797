//! Search and indexing subsystem for a streaming catalog.
//!
//! Keeps an Elasticsearch-compatible index in sync with the primary content
//! store and serves ranked search and autocomplete from it, falling back to
//! the store when the index is unavailable. See [`search::SearchService`].

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod search;
pub mod state;

pub use error::{AppError, Result};
