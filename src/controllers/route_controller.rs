//! Route workflow
//!
//! Submission, moderation and the public listings. Every method returns the
//! response DTO its handler serializes.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dto::route_dto::{
    AdminRouteListResponse, CityRoutesResponse, CleanupResponse, CreateRouteRequest,
    DeleteRouteResponse, RouteAdvisories, RouteDto, RouteListResponse, RouteResponse,
    RouteSearchQuery, SubmitRouteResponse,
};
use crate::middleware::AuthenticatedUser;
use crate::models::{NewRoute, RouteStatus};
use crate::repositories::{LocationRepository, RouteQuery, RouteRepository, UserRepository};
use crate::services::route_validation::{validate_route_candidate, RouteCandidate};
use crate::services::{LocationResolver, Metrics};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub const DEFAULT_CITY: &str = "Kolkata";

/// Window used by the recent-approvals cleanup
const CLEANUP_WINDOW_HOURS: i64 = 24;

pub struct RouteController {
    routes: Arc<dyn RouteRepository>,
    locations: Arc<dyn LocationRepository>,
    users: Arc<dyn UserRepository>,
    resolver: LocationResolver,
    metrics: Metrics,
}

fn to_dtos(routes: Vec<crate::models::RouteWithRelations>) -> Vec<RouteDto> {
    routes.into_iter().map(RouteDto::from).collect()
}

impl RouteController {
    pub fn new(state: &AppState) -> Self {
        Self {
            routes: state.repositories.routes.clone(),
            locations: state.repositories.locations.clone(),
            users: state.repositories.users.clone(),
            resolver: state.resolver.clone(),
            metrics: state.metrics.clone(),
        }
    }

    pub async fn submit(
        &self,
        request: CreateRouteRequest,
        caller: Option<AuthenticatedUser>,
    ) -> AppResult<SubmitRouteResponse> {
        let (from, to) = futures::try_join!(
            self.resolver
                .resolve(request.from_location_id, request.from_name.as_deref(), "from"),
            self.resolver
                .resolve(request.to_location_id, request.to_name.as_deref(), "to"),
        )?;

        let auto_color = request
            .auto_color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let route_validation = validate_route_candidate(&RouteCandidate {
            from_location_id: from.id,
            to_location_id: to.id,
            vehicle_type: request.vehicle_type,
            auto_color: auto_color.as_deref(),
        });
        if route_validation.is_suspicious {
            warn!("🧐 Suspicious route {} -> {}: {:?}", from.name, to.name, route_validation.reasons);
        }

        let user_id = self.submitter_id(caller).await?;

        let new_route = NewRoute {
            from_location_id: from.id,
            to_location_id: to.id,
            vehicle_type: request.vehicle_type,
            auto_color,
            via: request.via.clone().unwrap_or_default(),
        };
        let created = self
            .routes
            .create_submission(new_route, request.initial_fare(), user_id)
            .await?;

        self.metrics.route_submissions.inc();
        info!("🛣️ Route {} submitted: {} -> {}", created.route.id, from.name, to.name);

        Ok(SubmitRouteResponse {
            route: created.into(),
            ai: RouteAdvisories { route_validation },
        })
    }

    /// Only callers with a live user row are linked to their submission.
    async fn submitter_id(&self, caller: Option<AuthenticatedUser>) -> AppResult<Option<Uuid>> {
        let Some(user_id) = caller.and_then(|c| c.user_id()) else {
            return Ok(None);
        };
        Ok(self.users.find_by_id(user_id).await?.map(|user| user.id))
    }

    pub async fn pending(&self) -> AppResult<RouteListResponse> {
        let routes = self.routes.list(RouteQuery::Pending).await?;
        Ok(RouteListResponse { routes: to_dtos(routes) })
    }

    pub async fn all(&self) -> AppResult<AdminRouteListResponse> {
        let routes = to_dtos(self.routes.list(RouteQuery::All).await?);
        Ok(AdminRouteListResponse {
            total_routes: routes.len(),
            routes,
        })
    }

    /// Move a route to APPROVED or REJECTED together with its submissions.
    pub async fn moderate(&self, id: Uuid, status: RouteStatus) -> AppResult<RouteResponse> {
        let route = self
            .routes
            .transition_status(id, status)
            .await?
            .ok_or_else(|| not_found_error("Route", &id.to_string()))?;

        self.metrics
            .route_moderations
            .with_label_values(&[status.as_str()])
            .inc();
        info!("✅ Route {} is now {}", id, status.as_str());

        Ok(RouteResponse { route: route.into() })
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<DeleteRouteResponse> {
        let removed = self
            .routes
            .delete(id)
            .await?
            .ok_or_else(|| not_found_error("Route", &id.to_string()))?;

        info!("🗑️ Route {} deleted", id);
        Ok(DeleteRouteResponse {
            message: "Route deleted successfully".to_string(),
            deleted_route: removed.into(),
        })
    }

    /// APPROVED routes between locations matching the two queries.
    pub async fn search(&self, query: RouteSearchQuery) -> AppResult<RouteListResponse> {
        self.metrics.route_searches.inc();

        let (from_ids, to_ids) = futures::try_join!(
            self.resolver.matching_ids(&query.from),
            self.resolver.matching_ids(&query.to),
        )?;

        if from_ids.is_empty() || to_ids.is_empty() {
            debug!("🔍 No locations match '{}' -> '{}'", query.from, query.to);
            return Ok(RouteListResponse { routes: Vec::new() });
        }

        let routes = self
            .routes
            .list(RouteQuery::ApprovedBetween { from_ids, to_ids })
            .await?;
        Ok(RouteListResponse { routes: to_dtos(routes) })
    }

    /// APPROVED routes touching any location whose name contains `city`.
    pub async fn by_city(&self, city: Option<String>) -> AppResult<CityRoutesResponse> {
        let city = city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CITY.to_string());

        let location_ids = self.locations.ids_matching(&city).await?;
        if location_ids.is_empty() {
            return Ok(CityRoutesResponse {
                routes: Vec::new(),
                total_routes: 0,
                message: Some(format!("No locations found for {}", city)),
                city,
            });
        }

        let routes = to_dtos(
            self.routes
                .list(RouteQuery::ApprovedTouching { location_ids })
                .await?,
        );
        Ok(CityRoutesResponse {
            total_routes: routes.len(),
            routes,
            city,
            message: None,
        })
    }

    pub async fn cleanup_recent_approved(&self) -> AppResult<CleanupResponse> {
        let since = Utc::now() - Duration::hours(CLEANUP_WINDOW_HOURS);
        let deleted_count = self.routes.delete_approved_since(since).await?;

        info!("🧹 Deleted {} recently approved routes", deleted_count);
        Ok(CleanupResponse {
            message: format!(
                "Deleted {} routes approved in the last {} hours",
                deleted_count, CLEANUP_WINDOW_HOURS
            ),
            deleted_count,
        })
    }
}
