//! Domain models
//!
//! Structs mapping the PostgreSQL schema in `migrations/`.

pub mod fare;
pub mod location;
pub mod route;
pub mod submission;
pub mod user;

pub use fare::{Fare, FareValues};
pub use location::{Location, LocationType, NewLocation};
pub use route::{NewRoute, Route, RouteStatus, RouteWithRelations, StatusTransition, VehicleType, ViaPoint};
pub use submission::Submission;
pub use user::{User, UserRole};
