//! Services
//!
//! Domain logic shared by the controllers: location resolution, the advisory
//! checks, token issuing, OTP codes and metrics.

pub mod fare_anomaly;
pub mod jwt_service;
pub mod location_resolver;
pub mod metrics;
pub mod otp_service;
pub mod place_normalization;
pub mod route_validation;

pub use jwt_service::JwtService;
pub use location_resolver::LocationResolver;
pub use metrics::Metrics;
pub use otp_service::OtpService;
