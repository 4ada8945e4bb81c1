use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::route_dto::FareDto;
use crate::models::FareValues;
use crate::services::fare_anomaly::FareAnomalyResult;

// Create (no id) or update (id) the fare of a route
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertFareRequest {
    pub id: Option<Uuid>,
    pub route_id: Uuid,

    #[validate(range(min = 0))]
    pub min_fare: i32,

    #[validate(range(min = 0))]
    pub max_fare: i32,

    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl UpsertFareRequest {
    pub fn values(&self) -> FareValues {
        FareValues {
            min_fare: self.min_fare,
            max_fare: self.max_fare,
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FareAdvisories {
    pub fare_anomaly: FareAnomalyResult,
}

#[derive(Debug, Serialize)]
pub struct UpsertFareResponse {
    pub fare: FareDto,
    pub ai: FareAdvisories,
}
