//! Fare model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `fares` table. `min_fare <= max_fare` is expected, not enforced.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Fare {
    pub id: Uuid,
    pub route_id: Uuid,
    pub min_fare: i32,
    pub max_fare: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fare range and notes as entered by a user or admin
#[derive(Debug, Clone, PartialEq)]
pub struct FareValues {
    pub min_fare: i32,
    pub max_fare: i32,
    pub notes: Option<String>,
}

impl FareValues {
    pub fn into_fare(self, route_id: Uuid) -> Fare {
        Fare {
            id: Uuid::new_v4(),
            route_id,
            min_fare: self.min_fare,
            max_fare: self.max_fare,
            notes: self.notes,
            created_at: Utc::now(),
        }
    }
}
