use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::LocationRepository;
use crate::models::{Location, NewLocation};
use crate::utils::errors::{conflict_error, AppResult};

const LOCATION_COLUMNS: &str = "id, name, type, lat, lng, created_at";

pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(&format!(
            "SELECT {} FROM locations WHERE id = $1",
            LOCATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(&format!(
            "SELECT {} FROM locations WHERE name = $1",
            LOCATION_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn upsert_by_name(&self, location: NewLocation) -> AppResult<Location> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let location = sqlx::query_as::<_, Location>(&format!(
            r#"
            INSERT INTO locations (id, name, type, lat, lng)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&location.name)
        .bind(location.location_type)
        .bind(location.lat)
        .bind(location.lng)
        .fetch_one(&self.pool)
        .await?;

        Ok(location)
    }

    async fn create(&self, location: NewLocation) -> AppResult<Location> {
        let result = sqlx::query_as::<_, Location>(&format!(
            r#"
            INSERT INTO locations (id, name, type, lat, lng)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&location.name)
        .bind(location.location_type)
        .bind(location.lat)
        .bind(location.lng)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(conflict_error("Location", "name", &location.name))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ids_matching(&self, fragment: &str) -> AppResult<Vec<Uuid>> {
        let ids: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM locations WHERE strpos(lower(name), lower($1)) > 0")
                .bind(fragment)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn search(&self, fragments: &[String], limit: i64) -> AppResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(&format!(
            r#"
            SELECT {} FROM locations
            WHERE EXISTS (
                SELECT 1 FROM unnest($1::text[]) AS fragment
                WHERE strpos(lower(name), lower(fragment)) > 0
            )
            ORDER BY name ASC
            LIMIT $2
            "#,
            LOCATION_COLUMNS
        ))
        .bind(fragments.to_vec())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    async fn list_all(&self) -> AppResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(&format!(
            "SELECT {} FROM locations ORDER BY name ASC",
            LOCATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }
}
