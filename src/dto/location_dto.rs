use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Location, LocationType};
use crate::utils::validation::validate_not_blank;

// Location with the town it was matched to
#[derive(Debug, Clone, Serialize)]
pub struct LocationWithCity {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub city: &'static str,
}

impl From<Location> for LocationWithCity {
    fn from(location: Location) -> Self {
        let city = crate::models::location::city_for_location(&location.name);
        Self {
            id: location.id,
            name: location.name,
            location_type: location.location_type,
            lat: location.lat,
            lng: location.lng,
            city,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl From<Location> for LocationSummary {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            name: location.name,
            location_type: location.location_type,
            lat: location.lat,
            lng: location.lng,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocationListResponse<T> {
    pub locations: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationSearchQuery {
    pub q: Option<String>,
}

// Request to register a location by hand
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(custom = "validate_not_blank", length(max = 200))]
    pub name: String,

    #[serde(rename = "type")]
    pub location_type: LocationType,

    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CreateLocationResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub message: String,
}
