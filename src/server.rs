//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, the reconciliation worker,
//! and the Axum server lifecycle.

use crate::application::services::run_sync_worker;
use crate::config::Config;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::{
    CacheService, CounterStore, NullCache, RateLimitStore, RedisCache,
};
use crate::infrastructure::persistence::PgUrlRepository;
use crate::routes::app_router;
use crate::state::{AppState, RateLimitPolicy};

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool + migrations
/// - Redis cache layer (or NullCache fallback)
/// - Background reconciliation worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let (cache, counters, rate_limits) = connect_cache_layer(&config).await;

    let repository: Arc<dyn UrlRepository> = Arc::new(PgUrlRepository::new(Arc::new(pool)));

    let state = AppState::new(
        repository,
        cache,
        counters,
        rate_limits,
        RateLimitPolicy {
            max_requests: config.rate_limit_max_requests,
            window_seconds: config.rate_limit_window_seconds,
            behind_proxy: config.behind_proxy,
        },
        config.trending_limit,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(run_sync_worker(
        state.sync_service.clone(),
        Duration::from_secs(config.sync_interval_seconds),
        shutdown_rx,
    ));
    tracing::info!(
        "Reconciliation worker started (every {}s)",
        config.sync_interval_seconds
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Stop the reconciliation worker after the listener drains.
    let _ = shutdown_tx.send(true);

    Ok(())
}

/// Connects the Redis-backed cache layer, falling back to [`NullCache`]
/// when Redis is not configured or unreachable at startup.
///
/// One backend serves all three capabilities: URL cache, click counters
/// and rate-limit windows.
async fn connect_cache_layer(
    config: &Config,
) -> (
    Arc<dyn CacheService>,
    Arc<dyn CounterStore>,
    Arc<dyn RateLimitStore>,
) {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache layer enabled (Redis)");
                let redis = Arc::new(redis);
                return (redis.clone(), redis.clone(), redis);
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            }
        }
    } else {
        tracing::info!("Cache layer disabled (NullCache)");
    }

    let null = Arc::new(NullCache::new());
    (null.clone(), null.clone(), null)
}

/// Resolves when the process receives a termination signal.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
