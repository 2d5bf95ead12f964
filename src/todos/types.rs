//! Todo domain types and the response envelope shared by the service and handlers

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item as persisted in the backing file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Build a fresh todo with both timestamps set to `now`
    pub fn new(id: u64, fields: NewTodo) -> Self {
        let now = now_millis();
        Self {
            id,
            title: fields.title,
            body: fields.body,
            completed: fields.completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow-merge the provided fields and refresh `updated_at`
    pub fn apply(&mut self, update: UpdateTodoRequest) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(body) = update.body {
            self.body = body;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        self.touch();
    }

    /// Refresh `updated_at`, keeping it strictly later than the previous value
    /// even when two mutations land within the same millisecond.
    fn touch(&mut self) {
        let now = now_millis();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };
    }
}

/// Current time truncated to the precision used on disk
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Fields the store needs to materialise a new todo
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub body: String,
    pub completed: bool,
}

/// Validated input for todo creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTodoRequest {
    pub title: String,
    pub body: String,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub completed: Option<bool>,
}

/// Requested page; absent values fall back to page 1 / limit 10
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

impl PaginationParams {
    pub fn page_or_default(&self) -> usize {
        self.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit_or_default(&self) -> usize {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT)
    }
}

/// One page of todos plus the untruncated collection size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub data: Vec<Todo>,
    pub total: usize,
}

/// Aggregate completion counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Why a service call did not succeed; drives the HTTP status, never serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotFound,
    Invalid,
    Storage,
}

/// Uniform `{success, data?, message?, error?}` response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub failure: Option<Failure>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            failure: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Success without a payload (delete)
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
            failure: None,
        }
    }

    pub fn fail(failure: Failure, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
            failure: Some(failure),
        }
    }

    pub fn not_found(id: u64) -> Self {
        Self::fail(Failure::NotFound, format!("Todo with ID {id} not found"))
    }
}

/// Pagination block of the paginated listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Body of `GET /api/todos/paginated`
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse {
    pub success: bool,
    pub data: Vec<Todo>,
    pub pagination: Pagination,
}

/// ISO-8601 with millisecond precision and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Todo {
        Todo::new(
            1,
            NewTodo {
                title: "Learn Rust".to_string(),
                body: "Systems programming".to_string(),
                completed: false,
            },
        )
    }

    #[test]
    fn test_todo_serializes_camel_case_millis() {
        let todo = sample();
        let value = serde_json::to_value(&todo).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["completed"], false);
        let created = value["createdAt"].as_str().unwrap();
        assert!(created.ends_with('Z'));
        // 2024-01-20T10:30:00.000Z
        assert_eq!(created.len(), 24);
        assert!(value.get("updatedAt").is_some());
    }

    #[test]
    fn test_todo_parses_legacy_file_format() {
        let raw = r#"{
            "id": 7,
            "title": "Learn TypeScript",
            "body": "Master TypeScript with Express.js",
            "completed": true,
            "createdAt": "2024-01-20T10:30:00.000Z",
            "updatedAt": "2024-01-20T10:31:00.000Z"
        }"#;
        let todo: Todo = serde_json::from_str(raw).unwrap();
        assert_eq!(todo.id, 7);
        assert!(todo.completed);
        assert!(todo.updated_at > todo.created_at);
    }

    #[test]
    fn test_apply_merges_only_provided_fields() {
        let mut todo = sample();
        let before = todo.updated_at;
        todo.apply(UpdateTodoRequest {
            completed: Some(true),
            ..Default::default()
        });

        assert!(todo.completed);
        assert_eq!(todo.title, "Learn Rust");
        assert_eq!(todo.body, "Systems programming");
        assert!(todo.updated_at > before);
        assert_eq!(todo.created_at, before);
    }

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page_or_default(), 1);
        assert_eq!(params.limit_or_default(), 10);

        let params = PaginationParams {
            page: Some(3),
            limit: Some(25),
        };
        assert_eq!(params.page_or_default(), 3);
        assert_eq!(params.limit_or_default(), 25);
    }

    #[test]
    fn test_envelope_skips_empty_fields() {
        let env: Envelope<Todo> = Envelope::not_found(9);
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Todo with ID 9 not found");
        assert!(value.get("data").is_none());
        assert!(value.get("failure").is_none());
    }
}
