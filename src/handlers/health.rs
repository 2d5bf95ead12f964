//! Health and Infrastructure Handlers
//!
//! Home, health probes, metrics, and the fallbacks for unmatched routes and
//! panicking handlers.

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use std::any::Any;

use super::state::ServerState;
use crate::errors::AppError;
use crate::metrics;

/// Application state type alias
pub type AppState = std::sync::Arc<ServerState>;

/// Health response for main health endpoint
#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub uptime: f64,
}

/// GET /
pub async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Welcome to Todo API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "todos": "/api/todos",
            "health": "/health"
        }
    }))
}

/// Main health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        uptime: state.uptime_secs(),
    })
}

/// Liveness probe - always 200 if the process answers
pub async fn health_live() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "alive",
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}

/// Readiness probe - 503 while the backing file cannot be loaded
pub async fn health_ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let store = state.store().clone();
    let loaded = tokio::task::spawn_blocking(move || store.ensure_loaded())
        .await
        .map_err(anyhow::Error::from)
        .and_then(|r| r);

    match loaded {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "version": env!("CARGO_PKG_VERSION"),
                "todos": state.store().len(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "timestamp": chrono::Utc::now().to_rfc3339()
                })),
            )
        }
    }
}

/// Prometheus metrics endpoint
pub async fn metrics_endpoint() -> Result<String, StatusCode> {
    metrics::gather_text().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Fallback for unmatched routes
pub async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

/// Convert a handler panic into the generic 500 envelope
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::Internal(anyhow::anyhow!("Handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::{get, send, TestHarness};
    use super::*;

    #[tokio::test]
    async fn test_health_shape() {
        let h = TestHarness::new();
        let (status, body) = send(h.router(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Server is healthy");
        assert!(body["timestamp"].is_string());
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_envelope() {
        let h = TestHarness::new();
        let (status, body) = send(h.router(), get("/api/nothing-here")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Route GET /api/nothing-here not found");
    }

    #[test]
    fn test_panic_response_is_generic() {
        let response = panic_response(Box::new("secret detail".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
