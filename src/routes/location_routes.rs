use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::controllers::LocationController;
use crate::dto::location_dto::{
    CreateLocationRequest, CreateLocationResponse, LocationListResponse, LocationSearchQuery,
    LocationSummary, LocationWithCity,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{QueryParams, ValidatedJson};

/// `/locations`: directory listing, autocomplete and manual creation
pub fn create_location_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route("/search", get(search_locations))
}

async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<LocationListResponse<LocationWithCity>>, AppError> {
    Ok(Json(LocationController::new(&state).list().await?))
}

async fn search_locations(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LocationSearchQuery>,
) -> Result<Json<LocationListResponse<LocationSummary>>, AppError> {
    Ok(Json(LocationController::new(&state).search(query.q).await?))
}

async fn create_location(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateLocationRequest>,
) -> Result<(StatusCode, Json<CreateLocationResponse>), AppError> {
    let response = LocationController::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
