use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, patch},
    Extension, Json, Router,
};

use crate::controllers::RouteController;
use crate::dto::route_dto::{
    AdminRouteListResponse, CityQuery, CityRoutesResponse, CleanupResponse, CreateRouteRequest,
    DeleteRouteResponse, RouteListResponse, RouteResponse, RouteSearchQuery, SubmitRouteResponse,
};
use crate::middleware::{admin_middleware, optional_auth_middleware, AuthenticatedUser};
use crate::models::RouteStatus;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{IdPath, QueryParams, ValidatedJson, ValidatedQuery};

/// `/routes`: public search and submission, gated moderation
pub fn create_route_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(search_routes).post(submit_route))
        .route("/search", get(search_routes))
        .route("/city", get(city_routes))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware));

    let moderation = Router::new()
        .route("/pending", get(pending_routes))
        .route("/admin/all", get(all_routes))
        .route("/cleanup/recent-approved", delete(cleanup_recent_approved))
        .route("/:id/approve", patch(approve_route))
        .route("/:id/reject", patch(reject_route))
        .route("/:id", delete(delete_route))
        .route_layer(from_fn_with_state(state, admin_middleware));

    public.merge(moderation)
}

async fn search_routes(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<RouteSearchQuery>,
) -> Result<Json<RouteListResponse>, AppError> {
    Ok(Json(RouteController::new(&state).search(query).await?))
}

async fn submit_route(
    State(state): State<AppState>,
    caller: Option<Extension<AuthenticatedUser>>,
    ValidatedJson(request): ValidatedJson<CreateRouteRequest>,
) -> Result<(StatusCode, Json<SubmitRouteResponse>), AppError> {
    let caller = caller.map(|Extension(user)| user);
    let response = RouteController::new(&state).submit(request, caller).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn city_routes(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CityQuery>,
) -> Result<Json<CityRoutesResponse>, AppError> {
    Ok(Json(RouteController::new(&state).by_city(query.city).await?))
}

async fn pending_routes(State(state): State<AppState>) -> Result<Json<RouteListResponse>, AppError> {
    Ok(Json(RouteController::new(&state).pending().await?))
}

async fn all_routes(State(state): State<AppState>) -> Result<Json<AdminRouteListResponse>, AppError> {
    Ok(Json(RouteController::new(&state).all().await?))
}

async fn approve_route(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<RouteResponse>, AppError> {
    Ok(Json(
        RouteController::new(&state)
            .moderate(id, RouteStatus::Approved)
            .await?,
    ))
}

async fn reject_route(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<RouteResponse>, AppError> {
    Ok(Json(
        RouteController::new(&state)
            .moderate(id, RouteStatus::Rejected)
            .await?,
    ))
}

async fn delete_route(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<DeleteRouteResponse>, AppError> {
    Ok(Json(RouteController::new(&state).delete(id).await?))
}

async fn cleanup_recent_approved(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, AppError> {
    Ok(Json(RouteController::new(&state).cleanup_recent_approved().await?))
}
