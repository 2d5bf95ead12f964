//! Prometheus metrics for the todo server
//!
//! Exposes request rates/latencies and store activity at `/metrics`.
//! Paths are normalized before labelling so todo ids never become labels.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "todo_http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Total HTTP requests
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("todo_http_requests_total", "Total HTTP requests"),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Store mutations by outcome
    pub static ref STORE_OPERATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("todo_store_operations_total", "Total todo store mutations"),
        &["operation", "result"]
    ).unwrap();

    /// Number of todos in the collection after the last load or write
    pub static ref TODO_ITEMS_TOTAL: IntGauge = IntGauge::new(
        "todo_items_total",
        "Todos currently in the store"
    ).unwrap();
}

/// Register all metrics with the global registry; call once at startup
pub fn register_metrics() -> Result<(), prometheus::Error> {
    METRICS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(STORE_OPERATIONS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(TODO_ITEMS_TOTAL.clone()))?;
    Ok(())
}

pub fn record_store_op(operation: &str, success: bool) {
    let result = if success { "success" } else { "error" };
    STORE_OPERATIONS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
}

/// Render the registry in the prometheus text format
pub fn gather_text() -> Result<String, prometheus::Error> {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&METRICS_REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_op_counter() {
        let before = STORE_OPERATIONS_TOTAL
            .with_label_values(&["test_op", "success"])
            .get();
        record_store_op("test_op", true);
        let after = STORE_OPERATIONS_TOTAL
            .with_label_values(&["test_op", "success"])
            .get();
        assert_eq!(after, before + 1);
    }
}
