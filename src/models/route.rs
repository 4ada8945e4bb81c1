//! Route model
//!
//! A directed connection between two locations served by a vehicle type,
//! moderated through `PENDING -> APPROVED | REJECTED`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use super::fare::Fare;
use super::location::Location;

/// Vehicle serving a route - maps to the `vehicle_type` ENUM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    SharedAuto,
    Bus,
    MiniBus,
    ERickshaw,
    Other,
}

/// Moderation state - maps to the `route_status` ENUM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "route_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Pending,
    Approved,
    Rejected,
}

impl RouteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Pending => "PENDING",
            RouteStatus::Approved => "APPROVED",
            RouteStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RouteStatus::Pending)
    }

    /// Outcome of asking a route in `self` to move to `target`.
    pub fn transition_to(self, target: RouteStatus) -> StatusTransition {
        if self == target {
            StatusTransition::Unchanged
        } else if self == RouteStatus::Pending && target.is_terminal() {
            StatusTransition::Apply
        } else {
            StatusTransition::Illegal
        }
    }
}

/// Result of checking a moderation request against the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    Apply,
    Unchanged,
    Illegal,
}

/// Row of the `routes` table. `via` is kept as raw JSON and cleaned up on the
/// way out.
#[derive(Debug, Clone, FromRow)]
pub struct Route {
    pub id: Uuid,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub vehicle_type: VehicleType,
    pub auto_color: Option<String>,
    pub via: sqlx::types::Json<serde_json::Value>,
    pub status: RouteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Intermediate waypoint on a route
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViaPoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// Route joined with its endpoints and fares
#[derive(Debug, Clone)]
pub struct RouteWithRelations {
    pub route: Route,
    pub from_location: Location,
    pub to_location: Location,
    pub fares: Vec<Fare>,
}

/// Values needed to insert a route submission
#[derive(Debug, Clone)]
pub struct NewRoute {
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub vehicle_type: VehicleType,
    pub auto_color: Option<String>,
    pub via: Vec<ViaPoint>,
}

impl NewRoute {
    pub fn via_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.via).unwrap_or_else(|_| serde_json::Value::Array(Vec::new()))
    }

    pub fn into_route(self, status: RouteStatus) -> Route {
        let now = Utc::now();
        let via = self.via_json();
        Route {
            id: Uuid::new_v4(),
            from_location_id: self.from_location_id,
            to_location_id: self.to_location_id,
            vehicle_type: self.vehicle_type,
            auto_color: self.auto_color,
            via: sqlx::types::Json(via),
            status,
            created_at: now,
            updated_at: now,
        }
    }
}
