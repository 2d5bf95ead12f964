//! Todo storage and business logic
//!
//! Layered bottom-up: [`store::TodoStore`] owns the collection and its JSON
//! file, [`repository::TodoRepository`] applies defaults, and
//! [`service::TodoService`] enforces business rules and builds envelopes.

pub mod repository;
pub mod service;
pub mod store;
pub mod types;

pub use repository::TodoRepository;
pub use service::TodoService;
pub use store::TodoStore;
pub use types::{
    CreateTodoRequest, Envelope, Failure, PaginatedResponse, Pagination, PaginationParams, Todo,
    TodoStats, UpdateTodoRequest,
};
