//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, cache setup, worker spawning, and the Axum
//! server lifecycle including graceful shutdown.

use crate::config::{Config, mask_connection_string};
use crate::domain::click_queue::ClickQueue;
use crate::domain::click_worker::run_click_worker;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{SqliteClickRepository, SqliteLinkRepository};
use crate::routes::app_router;
use crate::state::{AppState, StateOptions};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// How long queued clicks may take to flush after the listener stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens the SQLite pool described by `config`, creating the file if needed.
pub async fn connect_database(config: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| {
            format!(
                "Invalid DATABASE_URL: {}",
                mask_connection_string(&config.database_url)
            )
        })?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Some(Duration::from_secs(config.db_idle_timeout)))
        .max_lifetime(Some(Duration::from_secs(config.db_max_lifetime)))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Picks Redis when configured and reachable, otherwise the no-op cache.
async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - SQLite connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Background click worker
/// - Axum HTTP server
///
/// On SIGINT/SIGTERM the listener stops accepting, in-flight requests finish,
/// and the click worker drains what is already queued before this returns.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache = build_cache(&config).await;

    let pool = Arc::new(pool);
    let (click_queue, click_rx) = ClickQueue::bounded(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        Arc::new(SqliteClickRepository::new(pool.clone())),
        Arc::new(SqliteLinkRepository::new(pool.clone())),
        config.click_worker_concurrency,
    ));
    tracing::info!(
        "Click worker started (capacity {}, concurrency {})",
        config.click_queue_capacity,
        config.click_worker_concurrency
    );

    let state = AppState::new(
        pool.clone(),
        cache,
        click_queue,
        StateOptions::from_config(&config),
    );

    let app = app_router(state, &config.cors_origins);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned the last queue sender, so the worker now sees a closed
    // channel and exits once the backlog is persisted.
    match tokio::time::timeout(DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("Click queue drained"),
        Ok(Err(e)) => tracing::error!("Click worker panicked: {}", e),
        Err(_) => tracing::warn!(
            "Click queue not drained within {}s, remaining clicks are lost",
            DRAIN_TIMEOUT.as_secs()
        ),
    }

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
