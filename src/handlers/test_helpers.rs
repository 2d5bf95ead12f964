//! Shared test utilities for handler unit tests.
//!
//! Provides a [`TestHarness`] that opens a `TodoStore` in a temp directory and
//! builds the router around it, plus helpers for building requests and reading
//! JSON response bodies.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot()

use super::router::build_router;
use super::state::ServerState;
use crate::config::ServerConfig;
use crate::todos::types::NewTodo;
use crate::todos::TodoStore;

/// A self-contained test environment with its own temp storage.
///
/// Holds `TempDir` so the directory isn't cleaned up until the harness drops.
pub struct TestHarness {
    pub state: Arc<ServerState>,
    _temp_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = temp_dir.path().join("todo.json");
        let config = ServerConfig {
            db_path: db_path.clone(),
            ..ServerConfig::default()
        };

        let store = Arc::new(TodoStore::open(db_path).expect("failed to open test store"));

        Self {
            state: Arc::new(ServerState::new(store, config)),
            _temp_dir: temp_dir,
        }
    }

    /// Create one todo per title directly through the store
    pub fn seed(&self, titles: &[&str]) {
        for title in titles {
            self.state
                .store()
                .create(NewTodo {
                    title: title.to_string(),
                    body: format!("{title} body"),
                    completed: false,
                })
                .expect("failed to seed todo");
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }
}

// ---------- Request builders ----------

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn with_json<T: serde::Serialize>(method: Method, uri: &str, body: &T) -> Request<Body> {
    let json = serde_json::to_string(body).unwrap();
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json))
        .unwrap()
}

pub fn post_json<T: serde::Serialize>(uri: &str, body: &T) -> Request<Body> {
    with_json(Method::POST, uri, body)
}

pub fn patch_json<T: serde::Serialize>(uri: &str, body: &T) -> Request<Body> {
    with_json(Method::PATCH, uri, body)
}

// ---------- Response helpers ----------

/// Send a request through the router and return (status, JSON body).
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body_bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&body_bytes).to_string())
        })
    };
    (status, json)
}
