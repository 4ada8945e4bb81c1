//! CORS
//!
//! Any origin in development (or outside production with no origin list);
//! only the configured origins otherwise.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::config::EnvironmentConfig;

pub fn cors_layer(config: &EnvironmentConfig) -> CorsLayer {
    if config.is_development() || (config.cors_origins.is_empty() && !config.is_production()) {
        return CorsLayer::very_permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
