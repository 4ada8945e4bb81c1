//! In-memory store
//!
//! Implements every repository trait over one `RwLock`-guarded state, so each
//! trait method is a single atomic unit of work. Used by the test-suite and
//! when the service runs without `DATABASE_URL`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FareRepository, LocationRepository, RouteQuery, RouteRepository, UserRepository};
use crate::models::{
    Fare, FareValues, Location, NewLocation, NewRoute, Route, RouteStatus, RouteWithRelations,
    StatusTransition, Submission, User,
};
use crate::utils::errors::{conflict_error, AppError, AppResult};

#[derive(Default)]
struct MemoryState {
    locations: Vec<Location>,
    routes: Vec<Route>,
    fares: Vec<Fare>,
    submissions: Vec<Submission>,
    users: HashMap<String, User>,
}

impl MemoryState {
    fn location(&self, id: Uuid) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    fn with_relations(&self, route: &Route) -> AppResult<RouteWithRelations> {
        let from_location = self.location(route.from_location_id).cloned();
        let to_location = self.location(route.to_location_id).cloned();
        match (from_location, to_location) {
            (Some(from_location), Some(to_location)) => Ok(RouteWithRelations {
                route: route.clone(),
                from_location,
                to_location,
                fares: self
                    .fares
                    .iter()
                    .filter(|f| f.route_id == route.id)
                    .cloned()
                    .collect(),
            }),
            _ => Err(AppError::Internal(format!(
                "route {} references a missing location",
                route.id
            ))),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Newest first; among equal timestamps the later insertion wins.
fn newest_first(mut routes: Vec<Route>) -> Vec<Route> {
    routes.reverse();
    routes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    routes
}

#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocationRepository for InMemoryRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Location>> {
        Ok(self.state.read().await.location(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Location>> {
        let state = self.state.read().await;
        Ok(state.locations.iter().find(|l| l.name == name).cloned())
    }

    async fn upsert_by_name(&self, location: NewLocation) -> AppResult<Location> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.locations.iter().find(|l| l.name == location.name) {
            return Ok(existing.clone());
        }
        let created = location.into_location();
        state.locations.push(created.clone());
        Ok(created)
    }

    async fn create(&self, location: NewLocation) -> AppResult<Location> {
        let mut state = self.state.write().await;
        if state.locations.iter().any(|l| l.name == location.name) {
            return Err(conflict_error("Location", "name", &location.name));
        }
        let created = location.into_location();
        state.locations.push(created.clone());
        Ok(created)
    }

    async fn ids_matching(&self, fragment: &str) -> AppResult<Vec<Uuid>> {
        let state = self.state.read().await;
        Ok(state
            .locations
            .iter()
            .filter(|l| contains_ignore_case(&l.name, fragment))
            .map(|l| l.id)
            .collect())
    }

    async fn search(&self, fragments: &[String], limit: i64) -> AppResult<Vec<Location>> {
        let state = self.state.read().await;
        let mut found: Vec<Location> = state
            .locations
            .iter()
            .filter(|l| fragments.iter().any(|f| contains_ignore_case(&l.name, f)))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }

    async fn list_all(&self) -> AppResult<Vec<Location>> {
        let mut locations = self.state.read().await.locations.clone();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}

#[async_trait]
impl RouteRepository for InMemoryRepository {
    async fn create_submission(
        &self,
        route: NewRoute,
        fare: Option<FareValues>,
        user_id: Option<Uuid>,
    ) -> AppResult<RouteWithRelations> {
        let mut state = self.state.write().await;

        if state.location(route.from_location_id).is_none() {
            return Err(AppError::InvalidLocationId(route.from_location_id));
        }
        if state.location(route.to_location_id).is_none() {
            return Err(AppError::InvalidLocationId(route.to_location_id));
        }

        let created = route.into_route(RouteStatus::Pending);
        if let Some(values) = fare {
            state.fares.push(values.into_fare(created.id));
        }
        state.submissions.push(Submission::pending(created.id, user_id));
        state.routes.push(created.clone());

        state.with_relations(&created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RouteWithRelations>> {
        let state = self.state.read().await;
        match state.routes.iter().find(|r| r.id == id) {
            Some(route) => Ok(Some(state.with_relations(route)?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.read().await.routes.iter().any(|r| r.id == id))
    }

    async fn list(&self, query: RouteQuery) -> AppResult<Vec<RouteWithRelations>> {
        let state = self.state.read().await;

        let routes: Vec<Route> = match &query {
            RouteQuery::All => newest_first(state.routes.clone()),
            RouteQuery::Pending => {
                let mut pending: Vec<Route> = state
                    .routes
                    .iter()
                    .filter(|r| r.status == RouteStatus::Pending)
                    .cloned()
                    .collect();
                pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                pending
            }
            RouteQuery::ApprovedBetween { from_ids, to_ids } => newest_first(
                state
                    .routes
                    .iter()
                    .filter(|r| {
                        r.status == RouteStatus::Approved
                            && from_ids.contains(&r.from_location_id)
                            && to_ids.contains(&r.to_location_id)
                    })
                    .cloned()
                    .collect(),
            ),
            RouteQuery::ApprovedTouching { location_ids } => newest_first(
                state
                    .routes
                    .iter()
                    .filter(|r| {
                        r.status == RouteStatus::Approved
                            && (location_ids.contains(&r.from_location_id)
                                || location_ids.contains(&r.to_location_id))
                    })
                    .cloned()
                    .collect(),
            ),
        };

        routes.iter().map(|r| state.with_relations(r)).collect()
    }

    async fn transition_status(
        &self,
        id: Uuid,
        status: RouteStatus,
    ) -> AppResult<Option<RouteWithRelations>> {
        let mut state = self.state.write().await;

        let Some(route) = state.routes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        match route.status.transition_to(status) {
            StatusTransition::Illegal => {
                return Err(AppError::Conflict(format!(
                    "Route {} is already {}",
                    id,
                    route.status.as_str()
                )));
            }
            StatusTransition::Unchanged => {}
            StatusTransition::Apply => {
                route.status = status;
                route.updated_at = Utc::now();
            }
        }
        let route = route.clone();

        for submission in state.submissions.iter_mut().filter(|s| s.route_id == id) {
            submission.status = status;
        }

        Ok(Some(state.with_relations(&route)?))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<RouteWithRelations>> {
        let mut state = self.state.write().await;

        let Some(index) = state.routes.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = state.with_relations(&state.routes[index])?;

        state.routes.remove(index);
        state.fares.retain(|f| f.route_id != id);
        state.submissions.retain(|s| s.route_id != id);

        Ok(Some(removed))
    }

    async fn delete_approved_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;

        let doomed: Vec<Uuid> = state
            .routes
            .iter()
            .filter(|r| r.status == RouteStatus::Approved && r.updated_at >= since)
            .map(|r| r.id)
            .collect();

        state.routes.retain(|r| !doomed.contains(&r.id));
        state.fares.retain(|f| !doomed.contains(&f.route_id));
        state.submissions.retain(|s| !doomed.contains(&s.route_id));

        Ok(doomed.len() as u64)
    }

    async fn submissions_for(&self, route_id: Uuid) -> AppResult<Vec<Submission>> {
        let state = self.state.read().await;
        Ok(state
            .submissions
            .iter()
            .filter(|s| s.route_id == route_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FareRepository for InMemoryRepository {
    async fn create(&self, route_id: Uuid, values: FareValues) -> AppResult<Fare> {
        let mut state = self.state.write().await;
        if !state.routes.iter().any(|r| r.id == route_id) {
            return Err(AppError::InvalidRoute(route_id));
        }
        let fare = values.into_fare(route_id);
        state.fares.push(fare.clone());
        Ok(fare)
    }

    async fn update(&self, id: Uuid, route_id: Uuid, values: FareValues) -> AppResult<Option<Fare>> {
        let mut state = self.state.write().await;
        let Some(fare) = state
            .fares
            .iter_mut()
            .find(|f| f.id == id && f.route_id == route_id)
        else {
            return Ok(None);
        };

        fare.min_fare = values.min_fare;
        fare.max_fare = values.max_fare;
        fare.notes = values.notes;
        Ok(Some(fare.clone()))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn upsert_by_phone(&self, phone: &str) -> AppResult<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .entry(phone.to_string())
            .or_insert_with(|| User::with_phone(phone.to_string()));
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleType;

    async fn seeded() -> (InMemoryRepository, Location, Location) {
        let repo = InMemoryRepository::new();
        let from = repo
            .upsert_by_name(NewLocation::landmark("Railway Station".into()))
            .await
            .unwrap();
        let to = repo
            .upsert_by_name(NewLocation::landmark("Government College".into()))
            .await
            .unwrap();
        (repo, from, to)
    }

    fn new_route(from: &Location, to: &Location) -> NewRoute {
        NewRoute {
            from_location_id: from.id,
            to_location_id: to.id,
            vehicle_type: VehicleType::Bus,
            auto_color: None,
            via: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_upsert_by_name_is_idempotent() {
        let (repo, from, _) = seeded().await;
        let again = repo
            .upsert_by_name(NewLocation::landmark("Railway Station".into()))
            .await
            .unwrap();
        assert_eq!(again.id, from.id);
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let (repo, _, _) = seeded().await;
        let err = LocationRepository::create(&repo, NewLocation::landmark("Railway Station".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_ids_matching_ignores_case() {
        let (repo, from, _) = seeded().await;
        assert_eq!(repo.ids_matching("RAILWAY").await.unwrap(), vec![from.id]);
        assert!(repo.ids_matching("airport").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transition_updates_submissions() {
        let (repo, from, to) = seeded().await;
        let created = repo
            .create_submission(new_route(&from, &to), None, None)
            .await
            .unwrap();

        let approved = repo
            .transition_status(created.route.id, RouteStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.route.status, RouteStatus::Approved);

        let submissions = repo.submissions_for(created.route.id).await.unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].status, RouteStatus::Approved);

        let err = repo
            .transition_status(created.route.id, RouteStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        assert!(repo
            .transition_status(Uuid::new_v4(), RouteStatus::Approved)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let (repo, from, to) = seeded().await;
        let fare = FareValues { min_fare: 10, max_fare: 15, notes: None };
        let created = repo
            .create_submission(new_route(&from, &to), Some(fare), None)
            .await
            .unwrap();
        assert_eq!(created.fares.len(), 1);

        let removed = repo.delete(created.route.id).await.unwrap().unwrap();
        assert_eq!(removed.fares.len(), 1);
        assert!(!repo.exists(created.route.id).await.unwrap());
        assert!(repo.submissions_for(created.route.id).await.unwrap().is_empty());
        assert!(repo.delete(created.route.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fare_update_requires_matching_route() {
        let (repo, from, to) = seeded().await;
        let created = repo
            .create_submission(new_route(&from, &to), None, None)
            .await
            .unwrap();
        let fare = FareRepository::create(
            &repo,
            created.route.id,
            FareValues { min_fare: 10, max_fare: 20, notes: None },
        )
        .await
        .unwrap();

        let values = FareValues { min_fare: 12, max_fare: 18, notes: Some("revised".into()) };
        let updated = repo
            .update(fare.id, created.route.id, values.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.min_fare, 12);
        assert!(repo.update(fare.id, Uuid::new_v4(), values).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_user_by_phone() {
        let repo = InMemoryRepository::new();
        let first = repo.upsert_by_phone("9999999999").await.unwrap();
        let second = repo.upsert_by_phone("9999999999").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(UserRepository::find_by_id(&repo, first.id).await.unwrap().unwrap().phone, "9999999999");
    }
}
