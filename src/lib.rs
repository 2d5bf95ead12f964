//! Todo API Library
//!
//! CRUD REST API for a single todo resource, persisted as a pretty-printed
//! JSON array in one file.
//!
//! # Layers
//! - [`todos::TodoStore`]: in-memory collection mirrored to disk
//! - [`todos::TodoRepository`]: defaults and delegation
//! - [`todos::TodoService`]: business rules and response envelopes
//! - [`handlers`]: axum routes, validation at the edge, status mapping

pub mod config;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod todos;
pub mod tracing_setup;
pub mod validation;
