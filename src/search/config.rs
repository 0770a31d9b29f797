//! Search configuration

use crate::search::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the search backend
    pub endpoint: String,

    /// Optional basic-auth credentials
    pub username: Option<String>,
    pub password: Option<String>,

    /// Prefix for the index name (`<prefix>_contents`)
    pub index_prefix: String,

    /// Timeout for index, document and query calls
    pub request_timeout_ms: u64,

    /// Timeout for cluster health calls
    pub health_timeout_ms: u64,

    /// Health polls before entering disconnected mode
    pub connect_retries: u32,

    /// Delay between startup health polls
    pub connect_retry_delay_ms: u64,

    /// Background health re-check interval (0 disables)
    pub health_check_interval_secs: u64,

    /// Ask the backend to refresh after every single-document write
    pub refresh_on_write: bool,

    /// Documents per bulk request during a full reindex
    pub reindex_batch_size: usize,

    /// Replicas for a newly created index
    pub number_of_replicas: u32,

    /// Search result cache TTL
    pub search_cache_ttl_secs: u64,

    /// Suggestion cache TTL
    pub suggest_cache_ttl_secs: u64,

    /// Maximum cached entries per cache
    pub cache_capacity: u64,

    /// Run the completion-suggester retrieval strategy
    pub enable_completion_suggester: bool,

    /// Run the bool-prefix retrieval strategy
    pub enable_prefix_suggester: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            index_prefix: "catalog".to_string(),
            request_timeout_ms: 5_000,
            health_timeout_ms: 2_000,
            connect_retries: 5,
            connect_retry_delay_ms: 3_000,
            health_check_interval_secs: 30,
            refresh_on_write: true,
            reindex_batch_size: 100,
            number_of_replicas: 0,
            search_cache_ttl_secs: 120,
            suggest_cache_ttl_secs: 60,
            cache_capacity: 10_000,
            enable_completion_suggester: true,
            enable_prefix_suggester: true,
        }
    }
}

impl SearchConfig {
    /// Name of the content index
    pub fn index_name(&self) -> String {
        format!("{}_contents", self.index_prefix)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_delay_ms)
    }

    /// Reject settings the subsystem cannot run with
    pub fn validate(&self) -> SearchResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(SearchError::InvalidConfiguration(
                "endpoint must not be empty".to_string(),
            ));
        }
        if self.index_prefix.trim().is_empty() {
            return Err(SearchError::InvalidConfiguration(
                "index_prefix must not be empty".to_string(),
            ));
        }
        if self.reindex_batch_size == 0 {
            return Err(SearchError::InvalidConfiguration(
                "reindex_batch_size must be at least 1".to_string(),
            ));
        }
        if self.connect_retries == 0 {
            return Err(SearchError::InvalidConfiguration(
                "connect_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self
    }

    pub fn index_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.index_prefix = prefix.into();
        self
    }

    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    pub fn health_timeout_ms(mut self, ms: u64) -> Self {
        self.config.health_timeout_ms = ms;
        self
    }

    pub fn connect_retries(mut self, retries: u32) -> Self {
        self.config.connect_retries = retries;
        self
    }

    pub fn connect_retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.connect_retry_delay_ms = ms;
        self
    }

    pub fn health_check_interval_secs(mut self, secs: u64) -> Self {
        self.config.health_check_interval_secs = secs;
        self
    }

    pub fn refresh_on_write(mut self, enabled: bool) -> Self {
        self.config.refresh_on_write = enabled;
        self
    }

    pub fn reindex_batch_size(mut self, size: usize) -> Self {
        self.config.reindex_batch_size = size;
        self
    }

    pub fn cache_ttls(mut self, search_secs: u64, suggest_secs: u64) -> Self {
        self.config.search_cache_ttl_secs = search_secs;
        self.config.suggest_cache_ttl_secs = suggest_secs;
        self
    }

    pub fn cache_capacity(mut self, capacity: u64) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    pub fn suggest_strategies(mut self, completion: bool, prefix: bool) -> Self {
        self.config.enable_completion_suggester = completion;
        self.config.enable_prefix_suggester = prefix;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
