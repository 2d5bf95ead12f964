//! Structured error types for the HTTP surface
//!
//! Every error renders as the same envelope the handlers use for successes:
//! `{success: false, error, code, field?}`. Server-side causes are logged,
//! never sent to the client.

use axum::{
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::FieldError;

/// Error body returned to API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,

    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code
    pub code: String,

    /// Offending input field, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Application error types with proper categorization
#[derive(Debug)]
pub enum AppError {
    // Validation Errors (400)
    Validation { field: String, message: String },
    InvalidTodoId(String),
    PayloadRejected(String),
    InvalidQuery(String),

    // Not Found Errors (404)
    RouteNotFound { method: String, path: String },

    // Payload Too Large (413)
    PayloadTooLarge,

    // Internal Errors (500)
    StorageError(String),
    Internal(anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Get error code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::InvalidTodoId(_) => "INVALID_TODO_ID",
            Self::PayloadRejected(_) => "INVALID_JSON",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::InvalidTodoId(_)
            | Self::PayloadRejected(_)
            | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,

            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,

            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            Self::StorageError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; 500-class errors stay generic
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::InvalidTodoId(_) => "Invalid todo ID".to_string(),
            Self::PayloadRejected(reason) => format!("Invalid request body: {reason}"),
            Self::InvalidQuery(reason) => format!("Invalid query string: {reason}"),
            Self::PayloadTooLarge => "Request body too large".to_string(),
            Self::RouteNotFound { method, path } => format!("Route {method} {path} not found"),
            Self::StorageError(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Convert to structured error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.message(),
            code: self.code().to_string(),
            field: match self {
                Self::Validation { field, .. } => Some(field.clone()),
                Self::InvalidTodoId(_) => Some("id".to_string()),
                _ => None,
            },
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageError(cause) => write!(f, "Storage error: {cause}"),
            Self::Internal(err) => write!(f, "Internal error: {err:#}"),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        Self::validation(err.field, err.message)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::PayloadRejected(rejection.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{self}");
        }

        (status, Json(self.to_response())).into_response()
    }
}

/// Type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;
