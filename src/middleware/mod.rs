//! Middleware
//!
//! Authentication, CORS and rate limiting.

pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::{admin_middleware, optional_auth_middleware, strict_admin_middleware, AuthenticatedUser};
pub use cors::cors_layer;
pub use rate_limit::{rate_limit_middleware, RateLimitState};
