//! Todo Handlers
//!
//! Edge validation, service dispatch on the blocking pool, and mapping of
//! service envelopes to HTTP status codes:
//! - success: 200 (201 for create)
//! - not found: 404
//! - validation and other failures: 400

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

use super::state::ServerState;
use crate::errors::AppError;
use crate::todos::{Envelope, Failure, PaginatedResponse, Todo, TodoService, TodoStats};
use crate::validation::{self, PaginationQuery, TodoPayload};

/// Application state type alias
pub type AppState = std::sync::Arc<ServerState>;

type EnvelopeResponse<T> = (StatusCode, Json<Envelope<T>>);

/// Run a service call on the blocking pool; file I/O happens inside
async fn with_service<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&TodoService) -> T + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(state.service()))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task failed: {e}")))
}

fn respond<T: Serialize>(envelope: Envelope<T>, success: StatusCode) -> EnvelopeResponse<T> {
    let status = match envelope.failure {
        None => success,
        Some(Failure::NotFound) => StatusCode::NOT_FOUND,
        Some(Failure::Invalid) | Some(Failure::Storage) => StatusCode::BAD_REQUEST,
    };
    (status, Json(envelope))
}

fn parse_id(raw: &str) -> Result<u64, AppError> {
    validation::validate_todo_id(raw).map_err(|_| AppError::InvalidTodoId(raw.to_string()))
}

/// An empty body is treated as `{}`
fn parse_payload(body: Result<Bytes, BytesRejection>) -> Result<TodoPayload, AppError> {
    let body = body?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TodoPayload::default());
    }
    serde_json::from_slice(&body).map_err(|e| AppError::PayloadRejected(e.to_string()))
}

/// GET /api/todos
pub async fn list_todos(State(state): State<AppState>) -> Result<EnvelopeResponse<Vec<Todo>>, AppError> {
    let envelope = with_service(&state, |svc| svc.get_all_todos()).await?;
    Ok(respond(envelope, StatusCode::OK))
}

/// GET /api/todos/paginated?page&limit
pub async fn list_paginated_todos(
    State(state): State<AppState>,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<Json<PaginatedResponse>, AppError> {
    let Query(query) = query?;
    let params = validation::validate_pagination(&query)?;

    let response = with_service(&state, move |svc| svc.get_paginated_todos(params))
        .await?
        .map_err(|e| AppError::StorageError(format!("{e:#}")))?;

    Ok(Json(response))
}

/// GET /api/todos/stats
pub async fn get_todo_stats(
    State(state): State<AppState>,
) -> Result<EnvelopeResponse<TodoStats>, AppError> {
    let envelope = with_service(&state, |svc| svc.get_todo_stats()).await?;
    Ok(respond(envelope, StatusCode::OK))
}

/// GET /api/todos/{id}
pub async fn get_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<EnvelopeResponse<Todo>, AppError> {
    let id = parse_id(&raw_id)?;
    let envelope = with_service(&state, move |svc| svc.get_todo_by_id(id)).await?;
    Ok(respond(envelope, StatusCode::OK))
}

/// POST /api/todos
pub async fn create_todo(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<EnvelopeResponse<Todo>, AppError> {
    let req = validation::validate_create(parse_payload(body)?)?;
    let envelope = with_service(&state, move |svc| svc.create_todo(req)).await?;
    Ok(respond(envelope, StatusCode::CREATED))
}

/// PUT/PATCH /api/todos/{id}
pub async fn update_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<EnvelopeResponse<Todo>, AppError> {
    let id = parse_id(&raw_id)?;
    let req = validation::validate_update(parse_payload(body)?)?;
    let envelope = with_service(&state, move |svc| svc.update_todo(id, req)).await?;
    Ok(respond(envelope, StatusCode::OK))
}

/// DELETE /api/todos/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<EnvelopeResponse<()>, AppError> {
    let id = parse_id(&raw_id)?;
    let envelope = with_service(&state, move |svc| svc.delete_todo(id)).await?;
    Ok(respond(envelope, StatusCode::OK))
}
