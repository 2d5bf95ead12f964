//! HTTP request tracking middleware

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Record latency and count per request, and log it at debug level
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();
    let normalized_path = normalize_path(&path);

    crate::metrics::HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &normalized_path, &status])
        .observe(duration);

    crate::metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &normalized_path, &status])
        .inc();

    tracing::debug!(
        method = %method,
        path = %normalized_path,
        status = %status,
        latency_ms = duration * 1000.0,
        "request"
    );

    response
}

/// Replace numeric segments so ids don't explode label cardinality
/// /api/todos/42 -> /api/todos/{id}
fn normalize_path(path: &str) -> String {
    let normalized: Vec<&str> = path
        .split('/')
        .filter(|part| !part.is_empty())
        .map(|part| {
            if part.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                part
            }
        })
        .collect();

    format!("/{}", normalized.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/api/todos/42"), "/api/todos/{id}");
        assert_eq!(normalize_path("/api/todos/stats"), "/api/todos/stats");
        assert_eq!(normalize_path("/api/todos/"), "/api/todos");
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/"), "/");
    }
}
