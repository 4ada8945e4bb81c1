//! Local route finder
//!
//! Backend of a community directory of local transit routes (shared autos,
//! buses, e-rickshaws). Anyone can search approved routes between two places
//! or submit a new one; admins approve or reject submissions and maintain
//! fares.
//!
//! # Layout
//! - `models` / `migrations/`: PostgreSQL schema and row types
//! - `repositories`: storage traits, with PostgreSQL and in-memory stores
//! - `services`: location resolution, advisory checks, OTP, JWT, metrics
//! - `controllers` / `routes`: the HTTP API
//!
//! # Running
//! ```sh
//! DATABASE_URL=postgres://localhost/routes cargo run
//! ```
//! Without `DATABASE_URL` everything is kept in memory.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn_with_state, Router};
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::{info, warn};

pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use cache::{CacheConfig, KeyValueStore, MemoryStore, RedisStore};
use config::{DatabaseConfig, EnvironmentConfig};
use middleware::{cors_layer, rate_limit_middleware};
use state::{AppState, Repositories};

/// Full application: routes plus the shared layers.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let max_concurrent_requests = state.config.max_concurrent_requests;
    let rate_limit = state.rate_limit.clone();

    routes::create_app_router(state)
        .layer(from_fn_with_state(rate_limit, rate_limit_middleware))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests))
}

async fn open_repositories(config: &EnvironmentConfig) -> Result<Repositories> {
    match &config.database_url {
        Some(url) => {
            let db_config = DatabaseConfig::new(url.clone(), config.database_max_connections);
            let pool = database::create_pool(&db_config).await?;
            Ok(Repositories::postgres(pool))
        }
        None => {
            warn!("⚠️ DATABASE_URL not set, keeping data in memory");
            Ok(Repositories::in_memory())
        }
    }
}

async fn open_otp_store(config: &EnvironmentConfig) -> Result<Arc<dyn KeyValueStore>> {
    let cache_config = CacheConfig::from(config);
    match &cache_config.redis_url {
        Some(url) => Ok(Arc::new(RedisStore::connect(url, &cache_config).await?)),
        None => {
            let store = MemoryStore::new();
            store.spawn_sweeper(Duration::from_secs(cache_config.sweep_interval_secs));
            Ok(Arc::new(store))
        }
    }
}

/// Connect the stores, build the app and serve until SIGINT/SIGTERM.
pub async fn start_server(config: EnvironmentConfig) -> Result<()> {
    utils::errors::expose_internal_details(!config.is_production());

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("invalid HOST/PORT: {}", config.server_url()))?;

    info!("🚌 Local Route Finder ({})", config.environment);
    if !config.admin_auth_required {
        warn!("⚠️ ADMIN_AUTH_REQUIRED=false: moderation endpoints are open");
    }

    let repositories = open_repositories(&config).await?;
    let otp_store = open_otp_store(&config).await?;
    let state = AppState::new(config, repositories, otp_store)?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("🛑 Ctrl+C received, shutting down..."),
        _ = terminate => info!("🛑 SIGTERM received, shutting down..."),
    }
}
