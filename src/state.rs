//! Shared application state
//!
//! Everything a handler needs, cloned into each request by the router.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::cache::{KeyValueStore, MemoryStore};
use crate::config::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::repositories::{
    FareRepository, InMemoryRepository, LocationRepository, PgFareRepository, PgLocationRepository,
    PgRouteRepository, PgUserRepository, RouteRepository, UserRepository,
};
use crate::services::{JwtService, LocationResolver, Metrics, OtpService};
use crate::utils::errors::AppResult;

/// The four stores the service reads and writes
#[derive(Clone)]
pub struct Repositories {
    pub locations: Arc<dyn LocationRepository>,
    pub routes: Arc<dyn RouteRepository>,
    pub fares: Arc<dyn FareRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            locations: Arc::new(PgLocationRepository::new(pool.clone())),
            routes: Arc::new(PgRouteRepository::new(pool.clone())),
            fares: Arc::new(PgFareRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = InMemoryRepository::new();
        Self {
            locations: Arc::new(store.clone()),
            routes: Arc::new(store.clone()),
            fares: Arc::new(store.clone()),
            users: Arc::new(store),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub repositories: Repositories,
    pub resolver: LocationResolver,
    pub otp: OtpService,
    pub jwt: JwtService,
    pub metrics: Metrics,
    pub rate_limit: RateLimitState,
    pub auth_rate_limit: RateLimitState,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        repositories: Repositories,
        otp_store: Arc<dyn KeyValueStore>,
    ) -> AppResult<Self> {
        let rate_limit = RateLimitState::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window),
        )
        .trust_proxy(config.trust_proxy);
        let auth_rate_limit = RateLimitState::new(
            config.auth_rate_limit_requests,
            Duration::from_secs(config.auth_rate_limit_window),
        )
        .trust_proxy(config.trust_proxy);

        Ok(Self {
            resolver: LocationResolver::new(repositories.locations.clone()),
            otp: OtpService::new(otp_store, Duration::from_secs(config.otp_ttl_seconds)),
            jwt: JwtService::new(&config),
            metrics: Metrics::new()?,
            rate_limit,
            auth_rate_limit,
            repositories,
            config: Arc::new(config),
        })
    }

    /// State backed entirely by in-process stores
    pub fn in_memory(config: EnvironmentConfig) -> AppResult<Self> {
        Self::new(config, Repositories::in_memory(), Arc::new(MemoryStore::new()))
    }
}
