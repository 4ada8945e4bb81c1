//! Advisory checks on submitted routes. Findings never block a submission.

use serde::Serialize;
use uuid::Uuid;

use crate::models::VehicleType;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteValidationResult {
    pub is_suspicious: bool,
    pub reasons: Vec<String>,
}

pub struct RouteCandidate<'a> {
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub vehicle_type: VehicleType,
    pub auto_color: Option<&'a str>,
}

pub fn validate_route_candidate(candidate: &RouteCandidate<'_>) -> RouteValidationResult {
    let mut reasons = Vec::new();

    if candidate.from_location_id == candidate.to_location_id {
        reasons.push("From and To locations are the same.".to_string());
    }

    let has_color = candidate.auto_color.is_some_and(|c| !c.trim().is_empty());
    if candidate.vehicle_type == VehicleType::SharedAuto && !has_color {
        reasons.push("Shared autos usually have a color code; autoColor is missing.".to_string());
    }

    RouteValidationResult {
        is_suspicious: !reasons.is_empty(),
        reasons,
    }
}
