use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::{RouteQuery, RouteRepository};
use crate::models::{
    Fare, FareValues, Location, NewRoute, Route, RouteStatus, RouteWithRelations, StatusTransition,
    Submission,
};
use crate::utils::errors::{AppError, AppResult};

const ROUTE_COLUMNS: &str =
    "id, from_location_id, to_location_id, vehicle_type, auto_color, via, status, created_at, updated_at";

pub struct PgRouteRepository {
    pool: PgPool,
}

impl PgRouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach endpoints and fares to a batch of routes with two extra queries.
    async fn load_relations(&self, routes: Vec<Route>) -> AppResult<Vec<RouteWithRelations>> {
        if routes.is_empty() {
            return Ok(Vec::new());
        }

        let route_ids: Vec<Uuid> = routes.iter().map(|r| r.id).collect();
        let location_ids: Vec<Uuid> = routes
            .iter()
            .flat_map(|r| [r.from_location_id, r.to_location_id])
            .collect();

        let locations: HashMap<Uuid, Location> = sqlx::query_as::<_, Location>(
            "SELECT id, name, type, lat, lng, created_at FROM locations WHERE id = ANY($1)",
        )
        .bind(&location_ids)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|l| (l.id, l))
        .collect();

        let mut fares: HashMap<Uuid, Vec<Fare>> = HashMap::new();
        let fare_rows = sqlx::query_as::<_, Fare>(
            r#"
            SELECT id, route_id, min_fare, max_fare, notes, created_at
            FROM fares WHERE route_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(&route_ids)
        .fetch_all(&self.pool)
        .await?;
        for fare in fare_rows {
            fares.entry(fare.route_id).or_default().push(fare);
        }

        routes
            .into_iter()
            .map(|route| {
                let from_location = locations.get(&route.from_location_id).cloned();
                let to_location = locations.get(&route.to_location_id).cloned();
                match (from_location, to_location) {
                    (Some(from_location), Some(to_location)) => Ok(RouteWithRelations {
                        fares: fares.remove(&route.id).unwrap_or_default(),
                        route,
                        from_location,
                        to_location,
                    }),
                    _ => Err(AppError::Internal(format!(
                        "route {} references a missing location",
                        route.id
                    ))),
                }
            })
            .collect()
    }

    async fn load_one(&self, route: Route) -> AppResult<RouteWithRelations> {
        self.load_relations(vec![route])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("route vanished while loading relations".to_string()))
    }

    async fn lock_route(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<Option<Route>> {
        let route = sqlx::query_as::<_, Route>(&format!(
            "SELECT {} FROM routes WHERE id = $1 FOR UPDATE",
            ROUTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(route)
    }
}

#[async_trait]
impl RouteRepository for PgRouteRepository {
    async fn create_submission(
        &self,
        route: NewRoute,
        fare: Option<FareValues>,
        user_id: Option<Uuid>,
    ) -> AppResult<RouteWithRelations> {
        let mut tx = self.pool.begin().await?;

        let via = route.via_json();
        let created = sqlx::query_as::<_, Route>(&format!(
            r#"
            INSERT INTO routes (id, from_location_id, to_location_id, vehicle_type, auto_color, via, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ROUTE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(route.from_location_id)
        .bind(route.to_location_id)
        .bind(route.vehicle_type)
        .bind(&route.auto_color)
        .bind(sqlx::types::Json(via))
        .bind(RouteStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(values) = fare {
            sqlx::query(
                r#"
                INSERT INTO fares (id, route_id, min_fare, max_fare, notes)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(created.id)
            .bind(values.min_fare)
            .bind(values.max_fare)
            .bind(values.notes)
            .execute(&mut *tx)
            .await?;
        }

        let submission = Submission::pending(created.id, user_id);
        sqlx::query("INSERT INTO submissions (id, route_id, user_id, status) VALUES ($1, $2, $3, $4)")
            .bind(submission.id)
            .bind(submission.route_id)
            .bind(submission.user_id)
            .bind(submission.status)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("💾 Route {} stored with submission {}", created.id, submission.id);

        self.load_one(created).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RouteWithRelations>> {
        let route = sqlx::query_as::<_, Route>(&format!(
            "SELECT {} FROM routes WHERE id = $1",
            ROUTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match route {
            Some(route) => Ok(Some(self.load_one(route).await?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM routes WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    async fn list(&self, query: RouteQuery) -> AppResult<Vec<RouteWithRelations>> {
        let routes = match query {
            RouteQuery::All => {
                sqlx::query_as::<_, Route>(&format!(
                    "SELECT {} FROM routes ORDER BY created_at DESC",
                    ROUTE_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
            RouteQuery::Pending => {
                sqlx::query_as::<_, Route>(&format!(
                    "SELECT {} FROM routes WHERE status = $1 ORDER BY created_at ASC",
                    ROUTE_COLUMNS
                ))
                .bind(RouteStatus::Pending)
                .fetch_all(&self.pool)
                .await?
            }
            RouteQuery::ApprovedBetween { from_ids, to_ids } => {
                sqlx::query_as::<_, Route>(&format!(
                    r#"
                    SELECT {} FROM routes
                    WHERE status = $1
                      AND from_location_id = ANY($2)
                      AND to_location_id = ANY($3)
                    ORDER BY created_at DESC
                    "#,
                    ROUTE_COLUMNS
                ))
                .bind(RouteStatus::Approved)
                .bind(from_ids)
                .bind(to_ids)
                .fetch_all(&self.pool)
                .await?
            }
            RouteQuery::ApprovedTouching { location_ids } => {
                sqlx::query_as::<_, Route>(&format!(
                    r#"
                    SELECT {} FROM routes
                    WHERE status = $1
                      AND (from_location_id = ANY($2) OR to_location_id = ANY($2))
                    ORDER BY created_at DESC
                    "#,
                    ROUTE_COLUMNS
                ))
                .bind(RouteStatus::Approved)
                .bind(location_ids)
                .fetch_all(&self.pool)
                .await?
            }
        };

        self.load_relations(routes).await
    }

    async fn transition_status(
        &self,
        id: Uuid,
        status: RouteStatus,
    ) -> AppResult<Option<RouteWithRelations>> {
        let mut tx = self.pool.begin().await?;

        let Some(current) = Self::lock_route(&mut tx, id).await? else {
            return Ok(None);
        };

        let route = match current.status.transition_to(status) {
            StatusTransition::Illegal => {
                return Err(AppError::Conflict(format!(
                    "Route {} is already {}",
                    id,
                    current.status.as_str()
                )));
            }
            StatusTransition::Unchanged => current,
            StatusTransition::Apply => {
                sqlx::query_as::<_, Route>(&format!(
                    "UPDATE routes SET status = $2, updated_at = now() WHERE id = $1 RETURNING {}",
                    ROUTE_COLUMNS
                ))
                .bind(id)
                .bind(status)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        sqlx::query("UPDATE submissions SET status = $2 WHERE route_id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(self.load_one(route).await?))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<RouteWithRelations>> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        // fares and submissions go with the route (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM routes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(existing))
    }

    async fn delete_approved_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM routes WHERE status = $1 AND updated_at >= $2")
            .bind(RouteStatus::Approved)
            .bind(since)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn submissions_for(&self, route_id: Uuid) -> AppResult<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"
            SELECT id, route_id, user_id, status, created_at
            FROM submissions WHERE route_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }
}
