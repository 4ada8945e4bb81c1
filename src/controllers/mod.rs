//! Controllers
//!
//! Built per request from [`AppState`](crate::state::AppState); handlers in
//! `routes/` delegate to them.

pub mod auth_controller;
pub mod fare_controller;
pub mod location_controller;
pub mod route_controller;

pub use auth_controller::AuthController;
pub use fare_controller::{FareController, FareOutcome};
pub use location_controller::LocationController;
pub use route_controller::RouteController;
