//! Advisory fare checks. Findings are reported, never enforced.

use serde::Serialize;

use crate::models::FareValues;

/// Highest max fare considered plausible for an in-town route
pub const MAX_PLAUSIBLE_FARE: i32 = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FareAnomalyResult {
    pub is_anomalous: bool,
    pub reasons: Vec<String>,
}

pub fn detect_fare_anomaly(fare: &FareValues) -> FareAnomalyResult {
    let mut reasons = Vec::new();

    if fare.min_fare > fare.max_fare {
        reasons.push("minFare is greater than maxFare.".to_string());
    }
    if fare.max_fare > MAX_PLAUSIBLE_FARE {
        reasons.push("Max fare is unusually high for a short-town route.".to_string());
    }

    FareAnomalyResult {
        is_anomalous: !reasons.is_empty(),
        reasons,
    }
}
