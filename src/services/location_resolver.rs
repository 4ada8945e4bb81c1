//! Location resolver
//!
//! Maps an explicit id or a free-text name onto a canonical [`Location`],
//! creating the location on first reference by name.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::models::{Location, NewLocation};
use crate::repositories::LocationRepository;
use crate::services::place_normalization::normalize_place_name;
use crate::utils::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct LocationResolver {
    locations: Arc<dyn LocationRepository>,
}

impl LocationResolver {
    pub fn new(locations: Arc<dyn LocationRepository>) -> Self {
        Self { locations }
    }

    /// Resolve one endpoint of a route. `side` names the endpoint in errors.
    pub async fn resolve(
        &self,
        id: Option<Uuid>,
        raw_name: Option<&str>,
        side: &'static str,
    ) -> AppResult<Location> {
        if let Some(id) = id {
            return self
                .locations
                .find_by_id(id)
                .await?
                .ok_or(AppError::InvalidLocationId(id));
        }

        let Some(raw_name) = raw_name else {
            return Err(AppError::MissingLocation(side));
        };

        let normalization = normalize_place_name(raw_name);
        if normalization.normalized.is_empty() {
            return Err(AppError::MissingLocation(side));
        }
        if !normalization.notes.is_empty() {
            debug!("📍 '{}' normalized to '{}': {:?}", raw_name, normalization.normalized, normalization.notes);
        }

        self.locations
            .upsert_by_name(NewLocation::landmark(normalization.normalized))
            .await
    }

    /// Ids of every location whose name contains the normalized `query`,
    /// ignoring case.
    pub async fn matching_ids(&self, query: &str) -> AppResult<Vec<Uuid>> {
        let normalized = normalize_place_name(query).normalized;
        if normalized.is_empty() {
            return Ok(Vec::new());
        }
        self.locations.ids_matching(&normalized).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryRepository;

    fn resolver() -> LocationResolver {
        LocationResolver::new(Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn test_resolve_by_name_creates_once() {
        let resolver = resolver();
        let first = resolver.resolve(None, Some("railway  station"), "from").await.unwrap();
        let second = resolver.resolve(None, Some(" RAILWAY STATION"), "from").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "Railway Station");
    }

    #[tokio::test]
    async fn test_resolve_by_id() {
        let resolver = resolver();
        let created = resolver.resolve(None, Some("college"), "to").await.unwrap();
        let found = resolver.resolve(Some(created.id), Some("ignored"), "to").await.unwrap();
        assert_eq!(found, created);

        let missing = Uuid::new_v4();
        let err = resolver.resolve(Some(missing), None, "to").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidLocationId(id) if id == missing));
    }

    #[tokio::test]
    async fn test_resolve_without_id_or_name() {
        let err = resolver().resolve(None, None, "from").await.unwrap_err();
        assert!(matches!(err, AppError::MissingLocation("from")));
        let err = resolver().resolve(None, Some("   "), "from").await.unwrap_err();
        assert!(matches!(err, AppError::MissingLocation("from")));
    }

    #[tokio::test]
    async fn test_matching_ids_substring() {
        let resolver = resolver();
        let station = resolver.resolve(None, Some("railway station"), "from").await.unwrap();
        resolver.resolve(None, Some("government college"), "to").await.unwrap();

        assert_eq!(resolver.matching_ids("railway").await.unwrap(), vec![station.id]);
        assert_eq!(resolver.matching_ids("  STATION ").await.unwrap(), vec![station.id]);
        assert!(resolver.matching_ids("airport").await.unwrap().is_empty());
        assert!(resolver.matching_ids("").await.unwrap().is_empty());
    }
}
