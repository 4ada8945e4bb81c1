use axum::{
    extract::State, http::StatusCode, middleware::from_fn_with_state, routing::post, Json, Router,
};

use crate::controllers::{FareController, FareOutcome};
use crate::dto::fare_dto::{UpsertFareRequest, UpsertFareResponse};
use crate::middleware::admin_middleware;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

/// `/fares`: fare upsert, gated like moderation
pub fn create_fare_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(upsert_fare))
        .route_layer(from_fn_with_state(state, admin_middleware))
}

async fn upsert_fare(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UpsertFareRequest>,
) -> Result<(StatusCode, Json<UpsertFareResponse>), AppError> {
    let (outcome, response) = FareController::new(&state).upsert(request).await?;
    let status = match outcome {
        FareOutcome::Created => StatusCode::CREATED,
        FareOutcome::Updated => StatusCode::OK,
    };
    Ok((status, Json(response)))
}
