// Eventhub API server
// Decision: In-memory dev mode when DATABASE_URL is unset
// Decision: Graceful shutdown closes the storage backend after in-flight requests finish

use anyhow::{Context, Result};
use eventhub_api::auth::AuthConfig;
use eventhub_api::storage::StorageBackend;
use eventhub_api::{build_app, ServerConfig};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("eventhub-api starting...");

    let config = ServerConfig::from_env();

    let storage = match &config.database_url {
        Some(url) => {
            let storage = StorageBackend::connect(url, config.database_max_connections)
                .await
                .context("Failed to initialize PostgreSQL storage")?;
            tracing::info!(
                max_connections = config.database_max_connections,
                "Connected to database"
            );
            storage
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            StorageBackend::in_memory()
        }
    };
    let storage = Arc::new(storage.with_call_timeout(config.store_call_timeout));

    let auth_config = AuthConfig::from_env();
    tracing::info!(
        token_lifetime_secs = auth_config.jwt.token_lifetime.as_secs(),
        cancel_policy = %config.cancel_policy,
        store_call_timeout_ms = config.store_call_timeout.as_millis() as u64,
        "Configuration loaded"
    );
    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }
    if config.cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS origins configured");
    }

    let app = build_app(storage.clone(), auth_config, &config);

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.http_addr))?;
    tracing::info!("HTTP server listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    storage.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
