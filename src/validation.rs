//! Input validation applied at the HTTP edge
//!
//! Error messages are part of the API contract and are returned verbatim.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::num::IntErrorKind;

use crate::todos::{CreateTodoRequest, PaginationParams, UpdateTodoRequest};

pub const MIN_TITLE_LENGTH: usize = 3;
pub const MIN_PAGE: usize = 1;
pub const MAX_LIMIT: usize = 100;

/// Raw create/update body; fields stay untyped so wrong JSON types get a proper message.
///
/// An explicit `null` arrives as `Some(Value::Null)`, only a missing key is `None`.
#[derive(Debug, Default, Deserialize)]
pub struct TodoPayload {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub body: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub completed: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Raw pagination query; non-numeric values fall back to the defaults
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Validation failure with the offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Absent, null, `""`, `0` and `false` count as "not provided"
fn is_blank(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn title_is_valid(title: &str) -> bool {
    title.trim().chars().count() >= MIN_TITLE_LENGTH
}

/// Validate a creation body; returns trimmed values
pub fn validate_create(payload: TodoPayload) -> std::result::Result<CreateTodoRequest, FieldError> {
    if is_blank(&payload.title) || is_blank(&payload.body) {
        let field = if is_blank(&payload.title) { "title" } else { "body" };
        return Err(FieldError::new(field, "Title and body are required"));
    }

    let (Some(Value::String(title)), Some(Value::String(body))) = (&payload.title, &payload.body)
    else {
        let field = if matches!(payload.title, Some(Value::String(_))) {
            "body"
        } else {
            "title"
        };
        return Err(FieldError::new(field, "Title and body must be strings"));
    };

    if !title_is_valid(title) {
        return Err(FieldError::new(
            "title",
            "Title must be at least 3 characters long",
        ));
    }

    if body.trim().is_empty() {
        return Err(FieldError::new("body", "Body cannot be empty"));
    }

    Ok(CreateTodoRequest {
        title: title.trim().to_string(),
        body: body.trim().to_string(),
    })
}

/// Validate a partial update; every field is optional
pub fn validate_update(payload: TodoPayload) -> std::result::Result<UpdateTodoRequest, FieldError> {
    let title = match payload.title {
        None | Some(Value::Null) => None,
        Some(Value::String(title)) if title_is_valid(&title) => Some(title.trim().to_string()),
        Some(_) => {
            return Err(FieldError::new(
                "title",
                "Title must be at least 3 characters long",
            ))
        }
    };

    let body = match payload.body {
        None | Some(Value::Null) => None,
        Some(Value::String(body)) if !body.trim().is_empty() => Some(body.trim().to_string()),
        Some(_) => return Err(FieldError::new("body", "Body cannot be empty")),
    };

    let completed = match payload.completed {
        None => None,
        Some(Value::Bool(completed)) => Some(completed),
        // Explicit null is a provided, non-boolean value
        Some(_) => return Err(FieldError::new("completed", "Completed must be a boolean")),
    };

    Ok(UpdateTodoRequest {
        title,
        body,
        completed,
    })
}

/// Path id must start with a positive integer; trailing garbage is ignored ("1abc" -> 1)
pub fn validate_todo_id(raw: &str) -> Result<u64> {
    match parse_number(Some(raw)) {
        Some(id) if id > 0 => Ok(id as u64),
        _ => Err(anyhow!("Invalid todo ID")),
    }
}

/// `page >= 1`, `1 <= limit <= 100`; unparseable values use the defaults
pub fn validate_pagination(query: &PaginationQuery) -> std::result::Result<PaginationParams, FieldError> {
    let page = parse_number(query.page.as_deref());
    let limit = parse_number(query.limit.as_deref());

    if matches!(page, Some(p) if p < MIN_PAGE as i64) {
        return Err(FieldError::new("page", "Page must be greater than 0"));
    }

    if matches!(limit, Some(l) if l < 1 || l > MAX_LIMIT as i64) {
        return Err(FieldError::new("limit", "Limit must be between 1 and 100"));
    }

    Ok(PaginationParams {
        page: page.map(|p| p as usize),
        limit: limit.map(|l| l as usize),
    })
}

/// Leading-integer parse: "12abc" -> 12, "abc" -> None.
/// Digit runs too large for `i64` saturate instead of falling back to the default.
fn parse_number(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    let end = raw
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map_or(raw.len(), |(i, _)| i);
    match raw[..end].parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}
