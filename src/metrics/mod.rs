//! Prometheus metrics for the search subsystem.
//!
//! Counters are labelled by operation (`search`, `suggest`, `index`,
//! `remove`, `reindex`) and, for read requests, by the path that served
//! them (`index`, `fallback`, `cache`, `empty`).
//!
//! # Example
//! ```no_run
//! use catalog_search::metrics::SEARCH_REQUESTS_TOTAL;
//!
//! SEARCH_REQUESTS_TOTAL
//!     .with_label_values(&["search", "index"])
//!     .inc();
//! ```

use lazy_static::lazy_static;
use prometheus::{CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry};

const NAMESPACE: &str = "catalog_search";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Read requests by operation and serving path
    ///
    /// Labels: operation, path
    pub static ref SEARCH_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("requests_total", "Total number of search and suggest requests")
            .namespace(NAMESPACE),
        &["operation", "path"]
    ).expect("Failed to create SEARCH_REQUESTS_TOTAL metric");

    /// Read request duration in seconds
    ///
    /// Labels: operation, path
    pub static ref SEARCH_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "request_duration_seconds",
            "Search and suggest request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["operation", "path"]
    ).expect("Failed to create SEARCH_REQUEST_DURATION_SECONDS metric");

    /// Index calls that failed and were absorbed
    ///
    /// Labels: operation
    pub static ref BACKEND_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("backend_errors_total", "Total number of failed search backend calls")
            .namespace(NAMESPACE),
        &["operation"]
    ).expect("Failed to create BACKEND_ERRORS_TOTAL metric");

    /// Documents written to or removed from the index
    ///
    /// Labels: operation, status
    pub static ref INDEX_OPERATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("index_operations_total", "Total number of document index operations")
            .namespace(NAMESPACE),
        &["operation", "status"]
    ).expect("Failed to create INDEX_OPERATIONS_TOTAL metric");

    /// 1 while the backend is reachable, 0 in disconnected mode
    pub static ref BACKEND_CONNECTED: Gauge = Gauge::with_opts(
        Opts::new("backend_connected", "Whether the search backend is reachable")
            .namespace(NAMESPACE)
    ).expect("Failed to create BACKEND_CONNECTED metric");
}

/// Register all metrics with the global registry
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_REQUEST_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(BACKEND_ERRORS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(INDEX_OPERATIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(BACKEND_CONNECTED.clone()))?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Record a served read request
pub fn record_request(operation: &str, path: &str, duration_secs: f64) {
    SEARCH_REQUESTS_TOTAL
        .with_label_values(&[operation, path])
        .inc();
    SEARCH_REQUEST_DURATION_SECONDS
        .with_label_values(&[operation, path])
        .observe(duration_secs);
}

pub fn record_backend_error(operation: &str) {
    BACKEND_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

pub fn record_index_operation(operation: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    INDEX_OPERATIONS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

pub fn set_backend_connected(connected: bool) {
    BACKEND_CONNECTED.set(if connected { 1.0 } else { 0.0 });
}

/// Generate Prometheus text format metrics.
///
/// Hosts embedding the crate serve this from their own `/metrics` route;
/// the CLI prints it with `--metrics`.
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
