//! HTTP routes
//!
//! One router per resource, assembled by [`create_app_router`].

pub mod auth_routes;
pub mod fare_routes;
pub mod location_routes;
pub mod route_routes;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .nest("/auth", auth_routes::create_auth_router(state.clone()))
        .nest("/routes", route_routes::create_route_router(state.clone()))
        .nest("/fares", fare_routes::create_fare_router(state.clone()))
        .nest("/locations", location_routes::create_location_router())
        .fallback(not_found)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFound",
            "message": format!("No route for {}", uri.path()),
        })),
    )
}
