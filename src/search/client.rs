//! HTTP client for an Elasticsearch-compatible search backend

use crate::search::config::SearchConfig;
use crate::search::document::{IndexedContent, SearchDocument};
use crate::search::error::{SearchError, SearchResult};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Cluster health as reported by `/_cluster/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    Green,
    Yellow,
    Red,
}

impl ClusterStatus {
    /// Green and yellow clusters serve reads and writes
    pub fn is_available(&self) -> bool {
        !matches!(self, ClusterStatus::Red)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterHealth {
    pub status: ClusterStatus,
}

/// Result of a single-document delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// A document the backend refused during a bulk request
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemFailure {
    pub id: String,
    pub reason: String,
}

/// Outcome of a bulk index request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSummary {
    pub succeeded: usize,
    pub failures: Vec<BulkItemFailure>,
}

/// Raw `_search` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub took: u64,

    #[serde(default)]
    pub hits: RawHits,

    #[serde(default)]
    pub suggest: HashMap<String, Vec<RawSuggestEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHits {
    #[serde(default)]
    pub total: Option<RawTotal>,

    #[serde(default)]
    pub hits: Vec<RawHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTotal {
    pub value: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_score", default)]
    pub score: Option<f32>,

    #[serde(rename = "_source", default)]
    pub source: Option<IndexedContent>,

    #[serde(default)]
    pub highlight: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSuggestEntry {
    #[serde(default)]
    pub options: Vec<RawSuggestOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSuggestOption {
    /// The suggestion input that matched
    pub text: String,

    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_score", default)]
    pub score: Option<f32>,

    #[serde(rename = "_source", default)]
    pub source: Option<IndexedContent>,
}

/// Operations the subsystem needs from a search backend.
///
/// Implementations must be `Send + Sync`; the service shares one instance
/// across request handlers and background tasks.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Cluster health, bounded by the health timeout
    async fn cluster_health(&self) -> SearchResult<ClusterHealth>;

    async fn index_exists(&self, index: &str) -> SearchResult<bool>;

    async fn create_index(&self, index: &str, body: &Value) -> SearchResult<()>;

    /// Delete an index; a missing index is not an error
    async fn delete_index(&self, index: &str) -> SearchResult<()>;

    async fn refresh_index(&self, index: &str) -> SearchResult<()>;

    /// Create or fully replace a document by ID
    async fn put_document(
        &self,
        index: &str,
        document: &SearchDocument,
        refresh: bool,
    ) -> SearchResult<()>;

    async fn delete_document(
        &self,
        index: &str,
        id: &str,
        refresh: bool,
    ) -> SearchResult<DeleteOutcome>;

    /// Index a batch of documents, reporting per-document failures
    async fn bulk_index(&self, index: &str, documents: &[SearchDocument])
        -> SearchResult<BulkSummary>;

    async fn search(&self, index: &str, body: &Value) -> SearchResult<RawSearchResponse>;
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkResponseItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkResponseItem {
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(default)]
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

/// Build an NDJSON `_bulk` body indexing every document by ID
pub fn bulk_body(documents: &[SearchDocument]) -> SearchResult<String> {
    let mut body = String::new();
    for document in documents {
        let action = serde_json::json!({ "index": { "_id": document.id } });
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(document)?);
        body.push('\n');
    }
    Ok(body)
}

/// `reqwest`-backed client for Elasticsearch/OpenSearch
#[derive(Clone)]
pub struct ElasticsearchClient {
    client: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
    health_timeout: Duration,
}

impl ElasticsearchClient {
    /// Create a new client from configuration
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        let base_url = Url::parse(&config.endpoint).map_err(|e| {
            SearchError::InvalidConfiguration(format!("Invalid endpoint {}: {}", config.endpoint, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SearchError::InvalidConfiguration(format!(
                "Endpoint {} cannot be used as a base URL",
                config.endpoint
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.health_timeout())
            .user_agent(concat!("catalog-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                SearchError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
            health_timeout: config.health_timeout(),
        })
    }

    fn url(&self, segments: &[&str]) -> SearchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SearchError::InvalidConfiguration("Endpoint cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.username {
            Some(ref username) => builder.basic_auth(username, self.password.as_ref()),
            None => builder,
        }
    }

    /// Turn a non-success response into an error
    async fn check(response: Response) -> SearchResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                SearchError::BackendUnavailable(format!("HTTP {}: {}", status.as_u16(), body))
            }
            _ => SearchError::Http {
                status: status.as_u16(),
                body,
            },
        })
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchClient {
    async fn cluster_health(&self) -> SearchResult<ClusterHealth> {
        let url = self.url(&["_cluster", "health"])?;
        let response = self
            .request(Method::GET, url)
            .timeout(self.health_timeout)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn index_exists(&self, index: &str) -> SearchResult<bool> {
        let url = self.url(&[index])?;
        let response = self.request(Method::HEAD, url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => Self::check(response).await.map(|_| true),
        }
    }

    async fn create_index(&self, index: &str, body: &Value) -> SearchResult<()> {
        let url = self.url(&[index])?;
        let response = self.request(Method::PUT, url).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> SearchResult<()> {
        let url = self.url(&[index])?;
        let response = self.request(Method::DELETE, url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response).await?;

        tracing::info!(index = %index, "Deleted search index");
        Ok(())
    }

    async fn refresh_index(&self, index: &str) -> SearchResult<()> {
        let url = self.url(&[index, "_refresh"])?;
        let response = self.request(Method::POST, url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn put_document(
        &self,
        index: &str,
        document: &SearchDocument,
        refresh: bool,
    ) -> SearchResult<()> {
        let url = self.url(&[index, "_doc", &document.id])?;
        let response = self
            .request(Method::PUT, url)
            .query(&[("refresh", refresh)])
            .json(document)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_document(
        &self,
        index: &str,
        id: &str,
        refresh: bool,
    ) -> SearchResult<DeleteOutcome> {
        let url = self.url(&[index, "_doc", id])?;
        let response = self
            .request(Method::DELETE, url)
            .query(&[("refresh", refresh)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::NotFound);
        }
        Self::check(response).await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn bulk_index(
        &self,
        index: &str,
        documents: &[SearchDocument],
    ) -> SearchResult<BulkSummary> {
        if documents.is_empty() {
            return Ok(BulkSummary::default());
        }

        let url = self.url(&[index, "_bulk"])?;
        let response = self
            .request(Method::POST, url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(bulk_body(documents)?)
            .send()
            .await?;
        let parsed: BulkResponse = Self::check(response).await?.json().await?;

        if parsed.errors {
            tracing::debug!(index = %index, "Bulk response reported item errors");
        }

        let mut summary = BulkSummary::default();
        // Each item is a single-key map: {"index": {...}}
        for item in parsed.items.into_iter().flat_map(HashMap::into_values) {
            match item.error {
                Some(error) => {
                    let reason = error
                        .get("reason")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string());
                    summary.failures.push(BulkItemFailure {
                        id: item.id,
                        reason: format!("HTTP {}: {}", item.status, reason),
                    });
                }
                None => summary.succeeded += 1,
            }
        }
        Ok(summary)
    }

    async fn search(&self, index: &str, body: &Value) -> SearchResult<RawSearchResponse> {
        let url = self.url(&[index, "_search"])?;
        let response = self.request(Method::POST, url).json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Content, ContentType};
    use crate::search::document::to_document;

    #[test]
    fn test_bulk_body_is_ndjson() {
        let docs = vec![
            to_document(&Content::new("m1", "One", ContentType::Movie)),
            to_document(&Content::new("m2", "Two", ContentType::Series)),
        ];

        let body = bulk_body(&docs).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(body.ends_with('\n'));

        let action: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(action["index"]["_id"], "m1");
        let source: Value = serde_json::from_str(lines[3]).unwrap();
        assert_eq!(source["title"], "Two");
    }

    #[test]
    fn test_url_segments_are_escaped() {
        let config = SearchConfig {
            endpoint: "http://localhost:9200/".to_string(),
            ..Default::default()
        };
        let client = ElasticsearchClient::new(&config).unwrap();

        let url = client.url(&["catalog_contents", "_doc", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/catalog_contents/_doc/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = SearchConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ElasticsearchClient::new(&config),
            Err(SearchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_cluster_status() {
        let health: ClusterHealth = serde_json::from_str(r#"{"status":"yellow","number_of_nodes":1}"#).unwrap();
        assert!(health.status.is_available());
        assert!(!ClusterStatus::Red.is_available());
    }
}
