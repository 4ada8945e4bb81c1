use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::FareRepository;
use crate::models::{Fare, FareValues};
use crate::utils::errors::{AppError, AppResult};

pub struct PgFareRepository {
    pool: PgPool,
}

impl PgFareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FareRepository for PgFareRepository {
    async fn create(&self, route_id: Uuid, values: FareValues) -> AppResult<Fare> {
        let fare = sqlx::query_as::<_, Fare>(
            r#"
            INSERT INTO fares (id, route_id, min_fare, max_fare, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, route_id, min_fare, max_fare, notes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(route_id)
        .bind(values.min_fare)
        .bind(values.max_fare)
        .bind(values.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_foreign_key_violation() {
                    return AppError::InvalidRoute(route_id);
                }
            }
            AppError::Database(e)
        })?;

        Ok(fare)
    }

    async fn update(&self, id: Uuid, route_id: Uuid, values: FareValues) -> AppResult<Option<Fare>> {
        let fare = sqlx::query_as::<_, Fare>(
            r#"
            UPDATE fares
            SET min_fare = $3, max_fare = $4, notes = $5
            WHERE id = $1 AND route_id = $2
            RETURNING id, route_id, min_fare, max_fare, notes, created_at
            "#,
        )
        .bind(id)
        .bind(route_id)
        .bind(values.min_fare)
        .bind(values.max_fare)
        .bind(values.notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fare)
    }
}
