//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Backend unreachable or reported unhealthy
    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend call exceeded its timeout
    #[error("Search backend timed out: {0}")]
    Timeout(String),

    /// Backend answered with a non-success status
    #[error("Search backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport-level failure other than timeout/connect
    #[error("Search request failed: {0}")]
    Transport(String),

    /// Request or response body could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A primary record cannot be turned into a search document
    #[error("Invalid document {id}: {reason}")]
    InvalidDocument { id: String, reason: String },

    /// Primary store read failed
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout(err.to_string())
        } else if err.is_connect() {
            SearchError::BackendUnavailable(err.to_string())
        } else if err.is_decode() {
            SearchError::Serialization(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Serialization(err.to_string())
    }
}

impl From<AppError> for SearchError {
    fn from(err: AppError) -> Self {
        SearchError::Store(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::Timeout(msg) => AppError::Timeout(msg),
            SearchError::BackendUnavailable(msg) => AppError::Network(msg),
            SearchError::InvalidDocument { .. } => AppError::Validation(err.to_string()),
            _ => AppError::Search(err.to_string()),
        }
    }
}
