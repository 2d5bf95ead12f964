//! HTTP API Handlers
//!
//! Route table, shared state, and the handlers for the todo API and the
//! infrastructure endpoints.

pub mod router;
pub mod state;

pub mod health;
pub mod todos;

// Test utilities (compiled only in test builds)
#[cfg(test)]
pub mod test_helpers;

pub use router::{build_app, build_public_routes, build_router, build_todo_routes, AppState};
pub use state::ServerState;
