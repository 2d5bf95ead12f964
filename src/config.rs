//! Configuration management for the todo server
//!
//! Sensible defaults, overridable through environment variables.

use std::env;
use std::path::PathBuf;
use tracing::info;

use crate::tracing_setup::LogFormat;

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Whether to allow credentials
    pub allow_credentials: bool,
    /// Max age for preflight cache (seconds)
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            allow_credentials: false,
            max_age_seconds: 86400,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl CorsConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origins) = env::var("TODO_CORS_ORIGINS") {
            config.allowed_origins = split_list(&origins);
        }

        if let Ok(methods) = env::var("TODO_CORS_METHODS") {
            config.allowed_methods = split_list(&methods)
                .into_iter()
                .map(|m| m.to_uppercase())
                .collect();
        }

        if let Ok(headers) = env::var("TODO_CORS_HEADERS") {
            config.allowed_headers = split_list(&headers);
        }

        if let Ok(val) = env::var("TODO_CORS_CREDENTIALS") {
            config.allow_credentials = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = env::var("TODO_CORS_MAX_AGE") {
            if let Ok(n) = val.parse() {
                config.max_age_seconds = n;
            }
        }

        config
    }

    pub fn is_restricted(&self) -> bool {
        !self.allowed_origins.is_empty()
    }

    /// Convert to tower-http CorsLayer
    pub fn to_layer(&self) -> tower_http::cors::CorsLayer {
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let mut layer = CorsLayer::new();

        if self.allowed_origins.is_empty() {
            layer = layer.allow_origin(Any);
        } else {
            let origins: Vec<axum::http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("CORS: Invalid origin '{}' - skipping", origin);
                        None
                    }
                })
                .collect();

            if origins.is_empty() {
                // Never fall back to permissive when explicit origins were configured
                tracing::error!("CORS: no configured origin could be parsed, rejecting all cross-origin requests");
            }
            layer = layer.allow_origin(AllowOrigin::list(origins));
        }

        let methods: Vec<axum::http::Method> = self
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect();
        layer = if methods.is_empty() {
            layer.allow_methods(Any)
        } else {
            layer.allow_methods(methods)
        };

        let headers: Vec<axum::http::HeaderName> = self
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        layer = if headers.is_empty() {
            layer.allow_headers(Any)
        } else {
            layer.allow_headers(headers)
        };

        // Credentials are incompatible with a wildcard origin
        if self.allow_credentials && self.is_restricted() {
            layer = layer.allow_credentials(true);
        }

        layer.max_age(std::time::Duration::from_secs(self.max_age_seconds))
    }
}

/// Server configuration loaded from environment with defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1)
    pub host: String,

    /// Listen port (default: 5000)
    pub port: u16,

    /// Backing JSON file (default: ./db/todo.json)
    pub db_path: PathBuf,

    /// Maximum accepted request body in bytes (default: 10 KiB)
    pub max_body_bytes: usize,

    /// Maximum concurrent requests (default: 200)
    pub max_concurrent_requests: usize,

    /// Seconds allowed for the final store flush on shutdown (default: 10)
    pub shutdown_timeout_secs: u64,

    /// Log line format
    pub log_format: LogFormat,

    /// Whether running in production mode
    pub is_production: bool,

    /// CORS configuration
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            db_path: PathBuf::from("./db/todo.json"),
            max_body_bytes: 10 * 1024,
            max_concurrent_requests: 200,
            shutdown_timeout_secs: 10,
            log_format: LogFormat::Text,
            is_production: false,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    #[allow(clippy::field_reassign_with_default)]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.is_production = env::var("TODO_ENV")
            .map(|v| {
                let v = v.to_lowercase();
                v == "production" || v == "prod"
            })
            .unwrap_or(false);

        if let Ok(val) = env::var("TODO_HOST") {
            config.host = val;
        }

        // The prefixed variable wins over the conventional PORT
        if let Some(port) = env::var("TODO_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.port = port;
        }

        if let Ok(val) = env::var("TODO_DB_PATH") {
            config.db_path = PathBuf::from(val);
        }

        if let Ok(val) = env::var("TODO_MAX_BODY_BYTES") {
            if let Ok(n) = val.parse() {
                config.max_body_bytes = n;
            }
        }

        if let Ok(val) = env::var("TODO_MAX_CONCURRENT") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_concurrent_requests = n.max(1);
            }
        }

        if let Ok(val) = env::var("TODO_SHUTDOWN_TIMEOUT") {
            if let Ok(n) = val.parse() {
                config.shutdown_timeout_secs = n;
            }
        }

        if let Ok(val) = env::var("TODO_LOG_FORMAT") {
            config.log_format = LogFormat::parse(&val);
        }

        config.cors = CorsConfig::from_env();

        if config.is_production && !config.cors.is_restricted() {
            tracing::warn!("CORS allows all origins in production. Set TODO_CORS_ORIGINS.");
        }

        config
    }

    /// Log the current configuration
    pub fn log(&self) {
        info!("Configuration:");
        info!(
            "   Mode: {}",
            if self.is_production {
                "production"
            } else {
                "development"
            }
        );
        info!("   Listen: {}:{}", self.host, self.port);
        info!("   Database file: {:?}", self.db_path);
        info!("   Max body: {} bytes", self.max_body_bytes);
        info!("   Max concurrent: {}", self.max_concurrent_requests);
        if self.cors.is_restricted() {
            info!("   CORS origins: {:?}", self.cors.allowed_origins);
        } else {
            info!("   CORS: permissive (all origins allowed)");
        }
    }
}
