use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::AuthController;
use crate::dto::auth_dto::{
    AdminLoginRequest, AdminLoginResponse, AdminVerifyResponse, LoginRequest, LoginResponse,
    OtpRequest, OtpRequestResponse,
};
use crate::middleware::{rate_limit_middleware, strict_admin_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

/// `/auth`: login endpoints share the stricter auth rate limit
pub fn create_auth_router(state: AppState) -> Router<AppState> {
    let verify = Router::new()
        .route("/admin/verify", get(verify_admin))
        .route_layer(from_fn_with_state(state.clone(), strict_admin_middleware));

    Router::new()
        .route("/otp", post(request_otp))
        .route("/login", post(login))
        .route("/admin/login", post(admin_login))
        .merge(verify)
        .route_layer(from_fn_with_state(state.auth_rate_limit.clone(), rate_limit_middleware))
}

async fn request_otp(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<OtpRequest>,
) -> Result<Json<OtpRequestResponse>, AppError> {
    Ok(Json(AuthController::new(&state).request_otp(request).await?))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(AuthController::new(&state).login(request).await?))
}

async fn admin_login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    Ok(Json(AuthController::new(&state).admin_login(request).await?))
}

async fn verify_admin(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
) -> Json<AdminVerifyResponse> {
    Json(AuthController::new(&state).verify_admin(admin))
}
