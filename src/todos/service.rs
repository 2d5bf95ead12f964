//! Business rules over the repository
//!
//! Every operation answers with an [`Envelope`]; store failures are logged
//! and replaced by a generic message. The paginated listing is the one
//! exception: it returns the error to the caller.

use anyhow::{Context, Result};

use super::repository::TodoRepository;
use super::types::{
    CreateTodoRequest, Envelope, Failure, PaginatedResponse, Pagination, PaginationParams, Todo,
    TodoStats, UpdateTodoRequest,
};
use crate::validation::MIN_TITLE_LENGTH;

#[derive(Clone)]
pub struct TodoService {
    repository: TodoRepository,
}

impl TodoService {
    pub fn new(repository: TodoRepository) -> Self {
        Self { repository }
    }

    pub fn get_all_todos(&self) -> Envelope<Vec<Todo>> {
        match self.repository.get_all() {
            Ok(todos) => Envelope::ok(todos),
            Err(e) => storage_failure(e, "Failed to fetch todos"),
        }
    }

    pub fn get_todo_by_id(&self, id: u64) -> Envelope<Todo> {
        match self.repository.get_by_id(id) {
            Ok(Some(todo)) => Envelope::ok(todo),
            Ok(None) => Envelope::not_found(id),
            Err(e) => storage_failure(e, "Failed to fetch todo"),
        }
    }

    pub fn create_todo(&self, req: CreateTodoRequest) -> Envelope<Todo> {
        if req.title.is_empty() || req.body.is_empty() {
            return Envelope::fail(Failure::Invalid, "Title and body are required");
        }

        if req.title.chars().count() < MIN_TITLE_LENGTH {
            return Envelope::fail(
                Failure::Invalid,
                "Title must be at least 3 characters long",
            );
        }

        match self.repository.create(req) {
            Ok(todo) => {
                tracing::info!(todo_id = todo.id, "Created todo");
                Envelope::ok(todo).with_message("Todo created successfully")
            }
            Err(e) => storage_failure(e, "Failed to create todo"),
        }
    }

    /// Existence is checked first; the store re-checks atomically, so a delete
    /// racing in between surfaces as a generic failure rather than a success.
    pub fn update_todo(&self, id: u64, req: UpdateTodoRequest) -> Envelope<Todo> {
        match self.repository.get_by_id(id) {
            Ok(Some(_)) => {}
            Ok(None) => return Envelope::not_found(id),
            Err(e) => return storage_failure(e, "Failed to update todo"),
        }

        update_outcome(id, self.repository.update(id, req))
    }

    pub fn delete_todo(&self, id: u64) -> Envelope<()> {
        match self.repository.get_by_id(id) {
            Ok(Some(_)) => {}
            Ok(None) => return Envelope::not_found(id),
            Err(e) => return storage_failure(e, "Failed to delete todo"),
        }

        delete_outcome(id, self.repository.delete(id))
    }

    pub fn get_paginated_todos(&self, params: PaginationParams) -> Result<PaginatedResponse> {
        let page = self
            .repository
            .paginate(params)
            .context("Failed to fetch paginated todos")?;

        let limit = params.limit_or_default();
        Ok(PaginatedResponse {
            success: true,
            data: page.data,
            pagination: Pagination {
                page: params.page_or_default(),
                limit,
                total: page.total,
                total_pages: page.total.div_ceil(limit),
            },
        })
    }

    pub fn get_todo_stats(&self) -> Envelope<TodoStats> {
        match self.repository.stats() {
            Ok(stats) => Envelope::ok(stats),
            Err(e) => storage_failure(e, "Failed to fetch todo statistics"),
        }
    }
}

/// The store re-checks existence; `None` means the todo vanished after the check
fn update_outcome(id: u64, outcome: Result<Option<Todo>>) -> Envelope<Todo> {
    match outcome {
        Ok(Some(todo)) => {
            tracing::info!(todo_id = id, "Updated todo");
            Envelope::ok(todo).with_message("Todo updated successfully")
        }
        Ok(None) => Envelope::fail(Failure::Invalid, "Failed to update todo"),
        Err(e) => storage_failure(e, "Failed to update todo"),
    }
}

fn delete_outcome(id: u64, outcome: Result<bool>) -> Envelope<()> {
    match outcome {
        Ok(true) => {
            tracing::info!(todo_id = id, "Deleted todo");
            Envelope::done("Todo deleted successfully")
        }
        Ok(false) => Envelope::fail(Failure::Invalid, "Failed to delete todo"),
        Err(e) => storage_failure(e, "Failed to delete todo"),
    }
}

fn storage_failure<T>(err: anyhow::Error, message: &str) -> Envelope<T> {
    tracing::error!(error = ?err, "{message}");
    Envelope::fail(Failure::Storage, message)
}
