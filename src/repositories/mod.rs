//! Storage access
//!
//! Handlers and controllers only see these traits. `AppState` carries one
//! implementation of each: the PostgreSQL repositories in production, or the
//! in-memory store in tests and database-less development runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Fare, FareValues, Location, NewLocation, NewRoute, RouteStatus, RouteWithRelations, Submission,
    User,
};
use crate::utils::errors::AppResult;

pub mod fare_repository;
pub mod location_repository;
pub mod memory;
pub mod route_repository;
pub mod user_repository;

pub use fare_repository::PgFareRepository;
pub use location_repository::PgLocationRepository;
pub use memory::InMemoryRepository;
pub use route_repository::PgRouteRepository;
pub use user_repository::PgUserRepository;

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Location>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Location>>;

    /// Return the location with exactly this name, creating it if needed.
    async fn upsert_by_name(&self, location: NewLocation) -> AppResult<Location>;

    /// Insert a new location; `Conflict` when the name is taken.
    async fn create(&self, location: NewLocation) -> AppResult<Location>;

    /// Ids of locations whose name contains `fragment`, ignoring case.
    async fn ids_matching(&self, fragment: &str) -> AppResult<Vec<Uuid>>;

    /// Locations whose name contains any of `fragments` (ignoring case),
    /// ordered by name.
    async fn search(&self, fragments: &[String], limit: i64) -> AppResult<Vec<Location>>;

    async fn list_all(&self) -> AppResult<Vec<Location>>;
}

/// Route listings the workflow needs
#[derive(Debug, Clone)]
pub enum RouteQuery {
    /// Every route, newest first
    All,
    /// PENDING routes, oldest first
    Pending,
    /// APPROVED routes from one id set to another, newest first
    ApprovedBetween { from_ids: Vec<Uuid>, to_ids: Vec<Uuid> },
    /// APPROVED routes with either endpoint in the set, newest first
    ApprovedTouching { location_ids: Vec<Uuid> },
}

#[async_trait]
pub trait RouteRepository: Send + Sync {
    /// Insert a PENDING route, its optional initial fare and one PENDING
    /// submission in a single unit of work.
    async fn create_submission(
        &self,
        route: NewRoute,
        fare: Option<FareValues>,
        user_id: Option<Uuid>,
    ) -> AppResult<RouteWithRelations>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RouteWithRelations>>;

    async fn exists(&self, id: Uuid) -> AppResult<bool>;

    async fn list(&self, query: RouteQuery) -> AppResult<Vec<RouteWithRelations>>;

    /// Move a route and all its submissions to `status` atomically.
    /// `None` when the route does not exist, `Conflict` when the state machine
    /// forbids the move.
    async fn transition_status(
        &self,
        id: Uuid,
        status: RouteStatus,
    ) -> AppResult<Option<RouteWithRelations>>;

    /// Hard-delete a route with its fares and submissions, returning what was
    /// removed.
    async fn delete(&self, id: Uuid) -> AppResult<Option<RouteWithRelations>>;

    /// Delete APPROVED routes updated at or after `since`.
    async fn delete_approved_since(&self, since: DateTime<Utc>) -> AppResult<u64>;

    async fn submissions_for(&self, route_id: Uuid) -> AppResult<Vec<Submission>>;
}

#[async_trait]
pub trait FareRepository: Send + Sync {
    async fn create(&self, route_id: Uuid, values: FareValues) -> AppResult<Fare>;

    /// Update fare `id` of route `route_id`; `None` when no such fare exists.
    async fn update(&self, id: Uuid, route_id: Uuid, values: FareValues) -> AppResult<Option<Fare>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Return the user with this phone, creating a regular user if needed.
    async fn upsert_by_phone(&self, phone: &str) -> AppResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
}
