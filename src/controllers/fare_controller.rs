use std::sync::Arc;

use tracing::{info, warn};

use crate::dto::fare_dto::{FareAdvisories, UpsertFareRequest, UpsertFareResponse};
use crate::repositories::{FareRepository, RouteRepository};
use crate::services::fare_anomaly::detect_fare_anomaly;
use crate::services::Metrics;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Whether an upsert inserted a new fare or changed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FareOutcome {
    Created,
    Updated,
}

pub struct FareController {
    fares: Arc<dyn FareRepository>,
    routes: Arc<dyn RouteRepository>,
    metrics: Metrics,
}

impl FareController {
    pub fn new(state: &AppState) -> Self {
        Self {
            fares: state.repositories.fares.clone(),
            routes: state.repositories.routes.clone(),
            metrics: state.metrics.clone(),
        }
    }

    /// Create (no id) or update (id) a fare. Anomalies are reported, never
    /// enforced.
    pub async fn upsert(&self, request: UpsertFareRequest) -> AppResult<(FareOutcome, UpsertFareResponse)> {
        if !self.routes.exists(request.route_id).await? {
            return Err(AppError::InvalidRoute(request.route_id));
        }

        let values = request.values();
        let fare_anomaly = detect_fare_anomaly(&values);
        if fare_anomaly.is_anomalous {
            self.metrics.fare_anomalies.inc();
            warn!("💸 Fare anomaly on route {}: {:?}", request.route_id, fare_anomaly.reasons);
        }

        let (outcome, fare) = match request.id {
            Some(id) => {
                let fare = self
                    .fares
                    .update(id, request.route_id, values)
                    .await?
                    .ok_or_else(|| not_found_error("Fare", &id.to_string()))?;
                (FareOutcome::Updated, fare)
            }
            None => (FareOutcome::Created, self.fares.create(request.route_id, values).await?),
        };

        info!("💰 Fare {} {:?} for route {}", fare.id, outcome, fare.route_id);
        Ok((
            outcome,
            UpsertFareResponse {
                fare: fare.into(),
                ai: FareAdvisories { fare_anomaly },
            },
        ))
    }
}
