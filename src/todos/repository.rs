//! Typed access to the store: applies creation and pagination defaults

use anyhow::Result;
use std::sync::Arc;

use super::store::TodoStore;
use super::types::{CreateTodoRequest, NewTodo, Page, PaginationParams, Todo, TodoStats, UpdateTodoRequest};

#[derive(Clone)]
pub struct TodoRepository {
    store: Arc<TodoStore>,
}

impl TodoRepository {
    pub fn new(store: Arc<TodoStore>) -> Self {
        Self { store }
    }

    pub fn get_all(&self) -> Result<Vec<Todo>> {
        self.store.find_all()
    }

    pub fn get_by_id(&self, id: u64) -> Result<Option<Todo>> {
        self.store.find_by_id(id)
    }

    /// New todos always start out not completed
    pub fn create(&self, req: CreateTodoRequest) -> Result<Todo> {
        self.store.create(NewTodo {
            title: req.title,
            body: req.body,
            completed: false,
        })
    }

    pub fn update(&self, id: u64, req: UpdateTodoRequest) -> Result<Option<Todo>> {
        self.store.update(id, req)
    }

    pub fn delete(&self, id: u64) -> Result<bool> {
        self.store.delete(id)
    }

    pub fn paginate(&self, params: PaginationParams) -> Result<Page> {
        self.store
            .paginate(params.page_or_default(), params.limit_or_default())
    }

    pub fn stats(&self) -> Result<TodoStats> {
        self.store.stats()
    }
}
