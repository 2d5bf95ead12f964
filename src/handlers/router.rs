//! Router Configuration - Centralized route definitions
//!
//! Public infrastructure routes and the todo API are built separately and
//! merged; `build_app` adds the global layers used by the binary.

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::catch_panic::CatchPanicLayer;

use super::state::ServerState;
use super::{health, todos};

/// Application state type alias
pub type AppState = Arc<ServerState>;

/// Home, health probes and metrics
pub fn build_public_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::health))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        .route("/metrics", get(health::metrics_endpoint))
        .with_state(state)
}

/// The todo API under /api/todos
pub fn build_todo_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/todos",
            get(todos::list_todos).post(todos::create_todo),
        )
        .route("/api/todos/paginated", get(todos::list_paginated_todos))
        .route("/api/todos/stats", get(todos::get_todo_stats))
        .route(
            "/api/todos/{id}",
            get(todos::get_todo)
                .put(todos::update_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .with_state(state)
}

/// All routes plus the not-found fallback, body limit and panic boundary
pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.server_config().max_body_bytes;

    Router::new()
        .merge(build_public_routes(state.clone()))
        .merge(build_todo_routes(state))
        .fallback(health::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(health::panic_response))
}

/// Router with request metrics, concurrency limit and CORS, as served
pub fn build_app(state: AppState) -> Router {
    let config = state.server_config().clone();

    build_router(state)
        .layer(axum::middleware::from_fn(crate::middleware::track_metrics))
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(config.cors.to_layer())
}
