//! Bearer token authentication
//!
//! `optional_auth_middleware` attaches the caller when a valid token is sent.
//! `admin_middleware` guards moderation endpoints and can be switched off with
//! `ADMIN_AUTH_REQUIRED=false`; `strict_admin_middleware` always applies.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::models::UserRole;
use crate::services::jwt_service::JwtClaims;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Caller identity, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub subject: String,
    pub role: UserRole,
    pub username: Option<String>,
}

impl AuthenticatedUser {
    /// Row id of a phone-login user; admins have none.
    pub fn user_id(&self) -> Option<Uuid> {
        match self.role {
            UserRole::User => Uuid::parse_str(&self.subject).ok(),
            UserRole::Admin => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<JwtClaims> for AuthenticatedUser {
    fn from(claims: JwtClaims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
            username: claims.username,
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedUser, AppError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;
    Ok(state.jwt.validate_token(token)?.into())
}

fn authenticate_admin(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedUser, AppError> {
    let user = authenticate(state, headers)?;
    if !user.is_admin() {
        return Err(AppError::Forbidden("Administrator role required".to_string()));
    }
    Ok(user)
}

pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match state.jwt.validate_token(token) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthenticatedUser::from(claims));
            }
            Err(e) => debug!("🔓 Ignoring invalid token on public route: {}", e),
        }
    }
    next.run(request).await
}

/// Admin behind the request. With gating off an anonymous caller passes as
/// `None`, but a valid admin token is still recognised.
fn admin_identity(state: &AppState, headers: &HeaderMap) -> Result<Option<AuthenticatedUser>, AppError> {
    if state.config.admin_auth_required {
        return authenticate_admin(state, headers).map(Some);
    }
    Ok(authenticate_admin(state, headers).ok())
}

pub async fn admin_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(admin) = admin_identity(&state, request.headers())? {
        request.extensions_mut().insert(admin);
    }
    Ok(next.run(request).await)
}

pub async fn strict_admin_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let admin = authenticate_admin(&state, request.headers())?;
    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    fn state(admin_auth_required: bool) -> AppState {
        AppState::in_memory(crate::config::EnvironmentConfig {
            admin_auth_required,
            ..Default::default()
        })
        .unwrap()
    }

    fn with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).unwrap();
        headers.insert(header::AUTHORIZATION, value);
        headers
    }

    #[test]
    fn test_admin_identity_when_required() {
        let state = state(true);
        assert!(matches!(
            admin_identity(&state, &HeaderMap::new()),
            Err(AppError::Unauthorized(_))
        ));

        let token = state.jwt.issue_admin_token("root").unwrap();
        let admin = admin_identity(&state, &with_token(&token)).unwrap().unwrap();
        assert!(admin.is_admin());
    }

    #[test]
    fn test_admin_identity_when_open() {
        let state = state(false);
        assert!(admin_identity(&state, &HeaderMap::new()).unwrap().is_none());
        assert!(admin_identity(&state, &with_token("garbage")).unwrap().is_none());

        let user = crate::models::User::with_phone("9999999999".into());
        let user_token = state.jwt.issue_user_token(&user).unwrap();
        assert!(admin_identity(&state, &with_token(&user_token)).unwrap().is_none());

        let token = state.jwt.issue_admin_token("root").unwrap();
        let admin = admin_identity(&state, &with_token(&token)).unwrap().unwrap();
        assert_eq!(admin.username.as_deref(), Some("root"));
    }

    #[test]
    fn test_user_id_only_for_users() {
        let id = Uuid::new_v4();
        let user = AuthenticatedUser { subject: id.to_string(), role: UserRole::User, username: None };
        assert_eq!(user.user_id(), Some(id));

        let admin = AuthenticatedUser { subject: "admin".into(), role: UserRole::Admin, username: None };
        assert!(admin.user_id().is_none());
        assert!(admin.is_admin());
    }
}
