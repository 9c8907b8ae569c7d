//! room-relay server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use room_relay::api;
use room_relay::app_state::AppState;
use room_relay::config::RelayConfig;
use room_relay::persistence::{InMemoryRoomStore, PostgresRoomStore, RoomStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        addr = %config.listen_addr,
        persistence = config.persistence_enabled,
        "starting room-relay"
    );

    // Build storage and the subscription core
    let store = build_store(&config).await?;
    let shutdown = CancellationToken::new();
    let app_state = AppState::new(store, &config, shutdown.clone());
    let registry = Arc::clone(&app_state.registry);

    // Build router
    let app = api::build_app(app_state).layer(api::request_timeout(config.request_timeout()));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let closed = registry.close_all().await;
            shutdown.cancel();
            tracing::info!(closed, "shutting down, subscribers cancelled");
        })
        .await
        .context("server error")?;

    Ok(())
}

/// Connects the configured room store, running migrations if requested.
async fn build_store(config: &RelayConfig) -> anyhow::Result<Arc<dyn RoomStore>> {
    if !config.persistence_enabled {
        tracing::warn!("persistence disabled, rooms and messages live in memory");
        return Ok(Arc::new(InMemoryRoomStore::new()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await
        .context("connecting to postgres")?;

    let store = PostgresRoomStore::new(pool);
    if config.run_migrations {
        store.migrate().await.context("running migrations")?;
        tracing::info!("migrations applied");
    }
    Ok(Arc::new(store))
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
