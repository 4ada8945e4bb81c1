//! Error handling
//!
//! Every failure in the service funnels into [`AppError`], which is turned
//! into a JSON response in one place.

use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::models::Location;

static EXPOSE_INTERNAL_DETAILS: OnceLock<bool> = OnceLock::new();

/// Decide once, at startup, whether 500 responses carry the underlying message.
pub fn expose_internal_details(expose: bool) {
    let _ = EXPOSE_INTERNAL_DETAILS.set(expose);
}

fn internal_details_exposed() -> bool {
    *EXPOSE_INTERNAL_DETAILS.get().unwrap_or(&false)
}

/// Main application errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Route '{0}' does not exist")]
    InvalidRoute(Uuid),

    #[error("Location '{0}' does not exist")]
    InvalidLocationId(Uuid),

    #[error("Missing '{0}' location: provide an id or a name")]
    MissingLocation(&'static str),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Location '{}' already exists", .0.name)]
    LocationExists(Box<Location>),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// API error body
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(rename = "existingLocation", skip_serializing_if = "Option::is_none")]
    existing_location: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
            code: Some(code.to_string()),
            existing_location: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Generic 500 body; the cause is only attached outside production.
fn server_failure(error: &str, code: &str, cause: String) -> (StatusCode, ErrorResponse) {
    let mut body = ErrorResponse::new(error, "An unexpected error occurred", code);
    if internal_details_exposed() {
        body = body.with_details(json!({ "cause": cause }));
    }
    (StatusCode::INTERNAL_SERVER_ERROR, body)
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::InvalidRoute(_)
            | AppError::InvalidLocationId(_)
            | AppError::MissingLocation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::LocationExists(_) => StatusCode::CONFLICT,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) | AppError::Cache(_) | AppError::Hash(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                server_failure("InternalServerError", "DB_ERROR", e.to_string())
            }

            AppError::Validation(e) => {
                warn!("⚠️ Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("ValidationError", "The provided data is invalid", "VALIDATION_ERROR")
                        .with_details(json!(e)),
                )
            }

            AppError::BadRequest(msg) => {
                warn!("⚠️ Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("ValidationError", msg, "BAD_REQUEST"),
                )
            }

            AppError::InvalidRoute(id) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("InvalidRoute", format!("Route '{}' does not exist", id), "INVALID_ROUTE"),
            ),

            AppError::InvalidLocationId(id) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "InvalidLocationId",
                    format!("Location '{}' does not exist", id),
                    "INVALID_LOCATION_ID",
                ),
            ),

            AppError::MissingLocation(side) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "MissingLocation",
                    format!("Provide either an id or a name for the '{}' location", side),
                    "MISSING_LOCATION",
                ),
            ),

            AppError::Unauthorized(msg) => {
                warn!("🔒 Unauthorized access: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("Unauthenticated", msg, "UNAUTHORIZED"),
                )
            }

            AppError::Jwt(msg) => {
                warn!("🔒 JWT error: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("InvalidToken", msg, "JWT_ERROR"),
                )
            }

            AppError::Forbidden(msg) => {
                warn!("🔒 Forbidden access: {}", msg);
                (
                    StatusCode::FORBIDDEN,
                    ErrorResponse::new("Forbidden", msg, "FORBIDDEN"),
                )
            }

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NotFound", msg, "NOT_FOUND"),
            ),

            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("Conflict", msg, "CONFLICT"),
            ),

            AppError::LocationExists(existing) => {
                let mut body = ErrorResponse::new(
                    "Conflict",
                    format!("Location '{}' already exists", existing.name),
                    "LOCATION_EXISTS",
                );
                body.existing_location = Some(json!({
                    "id": existing.id,
                    "name": existing.name,
                    "type": existing.location_type,
                }));
                (StatusCode::CONFLICT, body)
            }

            AppError::RateLimitExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse::new(
                    "RateLimitExceeded",
                    "Too many requests. Please try again later",
                    "RATE_LIMIT_EXCEEDED",
                ),
            ),

            AppError::Cache(msg) => {
                error!("❌ Cache error: {}", msg);
                server_failure("InternalServerError", "CACHE_ERROR", msg)
            }

            AppError::Hash(msg) => {
                error!("❌ Hash error: {}", msg);
                server_failure("InternalServerError", "HASH_ERROR", msg)
            }

            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                server_failure("InternalServerError", "INTERNAL_ERROR", msg)
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Typed result for fallible operations
pub type AppResult<T> = Result<T, AppError>;

/// Build a single-field validation error
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.message = Some(message.into());

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(validation_error("phone", "bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidRoute(Uuid::nil()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(not_found_error("Route", "x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(conflict_error("Location", "name", "X").status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Jwt("expired".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = not_found_error("Route", "abc");
        assert_eq!(err.to_string(), "Not found: Route with id 'abc' not found");
    }
}
