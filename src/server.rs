//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, redirect cache setup, worker spawning, and
//! Axum server lifecycle.

use crate::application::services::{RedirectResolver, RedirectService};
use crate::config::Config;
use crate::domain::hit_worker::run_hit_worker;
use crate::domain::repositories::RedirectRepository;
use crate::infrastructure::cache::RedirectCache;
use crate::infrastructure::persistence::PgRedirectRepository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Opens the PostgreSQL pool using the configured limits.
///
/// # Errors
///
/// Returns an error if no connection can be established.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redirect rule cache
/// - Background hit worker
/// - Axum HTTP server
///
/// Shuts down gracefully on Ctrl+C; in-flight requests complete first.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let repository: Arc<dyn RedirectRepository> =
        Arc::new(PgRedirectRepository::new(Arc::new(pool)));

    let (hit_tx, hit_rx) = mpsc::channel(config.hit_queue_capacity);
    tokio::spawn(run_hit_worker(
        hit_rx,
        repository.clone(),
        config.hit_worker_concurrency,
    ));
    tracing::info!("Hit worker started");

    let cache = Arc::new(RedirectCache::with_system_clock(config.redirect_cache_ttl()));
    let resolver = Arc::new(RedirectResolver::new(
        repository.clone(),
        cache,
        hit_tx.clone(),
    ));
    let redirect_service = Arc::new(RedirectService::new(repository));

    let state = AppState::new(
        redirect_service,
        resolver,
        config.admin_token.as_deref(),
        hit_tx,
    );

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
