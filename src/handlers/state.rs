//! Shared server state handed to every handler

use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::todos::{TodoRepository, TodoService, TodoStore};

/// Store, service and process metadata for the lifetime of the server
pub struct ServerState {
    store: Arc<TodoStore>,
    service: TodoService,
    config: ServerConfig,
    started_at: Instant,
}

impl ServerState {
    /// Wire store -> repository -> service
    pub fn new(store: Arc<TodoStore>, config: ServerConfig) -> Self {
        let service = TodoService::new(TodoRepository::new(store.clone()));
        Self {
            store,
            service,
            config,
            started_at: Instant::now(),
        }
    }

    pub fn service(&self) -> &TodoService {
        &self.service
    }

    pub fn store(&self) -> &Arc<TodoStore> {
        &self.store
    }

    pub fn server_config(&self) -> &ServerConfig {
        &self.config
    }

    /// Seconds since the state was built
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
