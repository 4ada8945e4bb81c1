use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{
    Fare, FareValues, Location, LocationType, RouteStatus, RouteWithRelations, VehicleType, ViaPoint,
};
use crate::services::route_validation::RouteValidationResult;
use crate::utils::validation::validate_not_blank;

// Location as exposed by the API; missing coordinates are reported as 0
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationDto {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub lat: f64,
    pub lng: f64,
}

impl From<Location> for LocationDto {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            name: location.name,
            location_type: location.location_type,
            lat: location.lat.unwrap_or(0.0),
            lng: location.lng.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FareDto {
    pub id: Uuid,
    pub route_id: Uuid,
    pub min_fare: i32,
    pub max_fare: i32,
    pub notes: Option<String>,
}

impl From<Fare> for FareDto {
    fn from(fare: Fare) -> Self {
        Self {
            id: fare.id,
            route_id: fare.route_id,
            min_fare: fare.min_fare,
            max_fare: fare.max_fare,
            notes: fare.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViaPointDto {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Clean up stored waypoints: entries that are not objects or have no name are
/// dropped, missing coordinates become 0.
pub fn via_points_from_json(via: &serde_json::Value) -> Vec<ViaPointDto> {
    let Some(entries) = via.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?;
            if name.is_empty() {
                return None;
            }
            Some(ViaPointDto {
                name: name.to_string(),
                lat: entry.get("lat").and_then(|v| v.as_f64()).unwrap_or(0.0),
                lng: entry.get("lng").and_then(|v| v.as_f64()).unwrap_or(0.0),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    pub id: Uuid,
    pub from_location: LocationDto,
    pub to_location: LocationDto,
    pub vehicle_type: VehicleType,
    pub auto_color: Option<String>,
    pub via: Vec<ViaPointDto>,
    pub status: RouteStatus,
    pub fares: Vec<FareDto>,
}

impl From<RouteWithRelations> for RouteDto {
    fn from(value: RouteWithRelations) -> Self {
        let RouteWithRelations {
            route,
            from_location,
            to_location,
            fares,
        } = value;

        Self {
            id: route.id,
            from_location: from_location.into(),
            to_location: to_location.into(),
            vehicle_type: route.vehicle_type,
            auto_color: route.auto_color,
            via: via_points_from_json(&route.via.0),
            status: route.status,
            fares: fares.into_iter().map(FareDto::from).collect(),
        }
    }
}

// Request to submit a new route. Endpoints come either as ids or as names.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_endpoint_pair"))]
pub struct CreateRouteRequest {
    pub from_location_id: Option<Uuid>,
    pub to_location_id: Option<Uuid>,

    #[validate(custom = "validate_not_blank", length(max = 200))]
    pub from_name: Option<String>,

    #[validate(custom = "validate_not_blank", length(max = 200))]
    pub to_name: Option<String>,

    pub vehicle_type: VehicleType,

    #[validate(length(min = 1, max = 50))]
    pub auto_color: Option<String>,

    #[validate(custom = "validate_via_points")]
    pub via: Option<Vec<ViaPoint>>,

    #[validate(range(min = 0))]
    pub min_fare: Option<i32>,

    #[validate(range(min = 0))]
    pub max_fare: Option<i32>,

    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl CreateRouteRequest {
    /// Initial fare, only when both ends of the range were given.
    pub fn initial_fare(&self) -> Option<FareValues> {
        match (self.min_fare, self.max_fare) {
            (Some(min_fare), Some(max_fare)) => Some(FareValues {
                min_fare,
                max_fare,
                notes: self.notes.clone(),
            }),
            _ => None,
        }
    }
}

fn validate_endpoint_pair(request: &CreateRouteRequest) -> Result<(), ValidationError> {
    let ids = request.from_location_id.is_some() && request.to_location_id.is_some();
    let names = request.from_name.is_some() && request.to_name.is_some();

    if ids || names {
        return Ok(());
    }

    let mut error = ValidationError::new("endpoints");
    error.message = Some(
        "Provide either location IDs or names for both 'from' and 'to' locations.".into(),
    );
    Err(error)
}

fn validate_via_points(via: &Vec<ViaPoint>) -> Result<(), ValidationError> {
    if via.iter().any(|point| point.name.trim().is_empty()) {
        let mut error = ValidationError::new("via_name");
        error.message = Some("every via point needs a name".into());
        return Err(error);
    }
    Ok(())
}

// Query for the public search endpoints
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RouteSearchQuery {
    #[serde(default)]
    #[validate(custom = "validate_not_blank")]
    pub from: String,

    #[serde(default)]
    #[validate(custom = "validate_not_blank")]
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteListResponse {
    pub routes: Vec<RouteDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRouteListResponse {
    pub routes: Vec<RouteDto>,
    pub total_routes: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRoutesResponse {
    pub routes: Vec<RouteDto>,
    pub city: String,
    pub total_routes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub route: RouteDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAdvisories {
    pub route_validation: RouteValidationResult,
}

#[derive(Debug, Serialize)]
pub struct SubmitRouteResponse {
    pub route: RouteDto,
    pub ai: RouteAdvisories,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRouteResponse {
    pub message: String,
    pub deleted_route: RouteDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: String,
    pub deleted_count: u64,
}
