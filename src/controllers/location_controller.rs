use std::sync::Arc;

use tracing::info;

use crate::dto::location_dto::{
    CreateLocationRequest, CreateLocationResponse, LocationListResponse, LocationSummary,
    LocationWithCity,
};
use crate::models::NewLocation;
use crate::repositories::LocationRepository;
use crate::services::place_normalization::normalize_place_name;
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppError, AppResult};

/// Autocomplete result cap
pub const SEARCH_LIMIT: i64 = 10;

pub struct LocationController {
    locations: Arc<dyn LocationRepository>,
}

impl LocationController {
    pub fn new(state: &AppState) -> Self {
        Self {
            locations: state.repositories.locations.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<LocationListResponse<LocationWithCity>> {
        let locations = self.locations.list_all().await?;
        Ok(LocationListResponse {
            locations: locations.into_iter().map(LocationWithCity::from).collect(),
        })
    }

    /// Names containing either the normalized or the raw query.
    pub async fn search(&self, q: Option<String>) -> AppResult<LocationListResponse<LocationSummary>> {
        let raw = q.as_deref().map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Ok(LocationListResponse { locations: Vec::new() });
        }

        let normalized = normalize_place_name(raw).normalized;
        let mut fragments = vec![normalized];
        if fragments[0] != raw {
            fragments.push(raw.to_string());
        }

        let locations = self.locations.search(&fragments, SEARCH_LIMIT).await?;
        Ok(LocationListResponse {
            locations: locations.into_iter().map(LocationSummary::from).collect(),
        })
    }

    pub async fn create(&self, request: CreateLocationRequest) -> AppResult<CreateLocationResponse> {
        let name = normalize_place_name(&request.name).normalized;
        if name.is_empty() {
            return Err(validation_error("name", "Location name is required"));
        }

        if let Some(existing) = self.locations.find_by_name(&name).await? {
            return Err(AppError::LocationExists(Box::new(existing)));
        }

        let created = self
            .locations
            .create(NewLocation {
                name,
                location_type: request.location_type,
                lat: request.lat,
                lng: request.lng,
            })
            .await?;

        info!("📍 New location created: {}", created.name);
        Ok(CreateLocationResponse {
            id: created.id,
            name: created.name,
            location_type: created.location_type,
            message: "Location created successfully".to_string(),
        })
    }
}
