//! Location model
//!
//! Canonical named places. The normalized name is the de-duplication key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Kind of place - maps to the `location_type` ENUM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "location_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    #[default]
    Landmark,
    BusStop,
    Area,
    Other,
}

/// Row of the `locations` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    pub location_type: LocationType,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Values needed to insert a location
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub name: String,
    pub location_type: LocationType,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl NewLocation {
    /// Location created on first reference by name, without coordinates.
    pub fn landmark(name: String) -> Self {
        Self {
            name,
            location_type: LocationType::Landmark,
            lat: None,
            lng: None,
        }
    }

    pub fn into_location(self) -> Location {
        Location {
            id: Uuid::new_v4(),
            name: self.name,
            location_type: self.location_type,
            lat: self.lat,
            lng: self.lng,
            created_at: Utc::now(),
        }
    }
}

/// Keyword table used to label a location with the town it belongs to.
const CITY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Durgapur",
        &[
            "bengal college",
            "prantika",
            "railway station",
            "durgapur",
            "bidhannagar",
            "benachity",
            "city centre",
            "fuljhore",
        ],
    ),
    ("Pune", &["pune", "shivaji", "koregaon", "camp", "swargate", "katraj"]),
    (
        "Kolkata",
        &["kolkata", "howrah", "salt lake", "park street", "newtown", "garia"],
    ),
];

/// Town a location name belongs to, or `"Unknown"`.
pub fn city_for_location(name: &str) -> &'static str {
    let name = name.to_lowercase();
    CITY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map(|(city, _)| *city)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_for_location() {
        assert_eq!(city_for_location("Railway Station"), "Durgapur");
        assert_eq!(city_for_location("Swargate Bus Depot"), "Pune");
        assert_eq!(city_for_location("Salt Lake Sector V"), "Kolkata");
        assert_eq!(city_for_location("Old Market"), "Unknown");
    }

    #[test]
    fn test_location_type_wire_format() {
        let json = serde_json::to_string(&LocationType::BusStop).unwrap();
        assert_eq!(json, "\"BUS_STOP\"");
        let parsed: LocationType = serde_json::from_str("\"AREA\"").unwrap();
        assert_eq!(parsed, LocationType::Area);
    }
}
