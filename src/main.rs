//! Todo API server
//!
//! Loads configuration from the environment, opens the JSON file store and
//! serves the REST API until Ctrl+C / SIGTERM, then flushes the store.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use todo_api::config::ServerConfig;
use todo_api::handlers::{build_app, ServerState};
use todo_api::todos::TodoStore;
use todo_api::{metrics, tracing_setup};

#[tokio::main]
async fn main() -> Result<()> {
    let server_config = ServerConfig::from_env();

    tracing_setup::init_tracing(server_config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    metrics::register_metrics().context("Failed to register metrics")?;

    info!("Starting todo API server...");
    server_config.log();

    let store_path = server_config.db_path.clone();
    let store = tokio::task::spawn_blocking(move || TodoStore::open(store_path))
        .await
        .context("Store open task failed")??;
    let store = Arc::new(store);

    let state = Arc::new(ServerState::new(store.clone(), server_config.clone()));
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                server_config.host, server_config.port
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);
    info!("Health check at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown signal received, flushing todo store...");

    let close = tokio::task::spawn_blocking(move || store.close());
    match tokio::time::timeout(Duration::from_secs(server_config.shutdown_timeout_secs), close).await
    {
        Ok(Ok(Ok(()))) => info!("Todo store flushed"),
        Ok(Ok(Err(e))) => tracing::error!("Failed to flush todo store: {e:#}"),
        Ok(Err(e)) => tracing::error!("Store close task failed: {e}"),
        Err(_) => {
            tracing::error!(
                "Store flush timed out after {}s",
                server_config.shutdown_timeout_secs
            );
            std::process::exit(1);
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
