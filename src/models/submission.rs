//! Submission model
//!
//! Audit record of who proposed a route. Its status mirrors the route's.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::route::RouteStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Submission {
    pub id: Uuid,
    pub route_id: Uuid,
    pub user_id: Option<Uuid>,
    pub status: RouteStatus,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn pending(route_id: Uuid, user_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            route_id,
            user_id,
            status: RouteStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
