//! Prometheus counters for the route workflow

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::utils::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub route_submissions: IntCounter,
    pub route_moderations: IntCounterVec,
    pub route_searches: IntCounter,
    pub fare_anomalies: IntCounter,
}

impl Metrics {
    pub fn new() -> AppResult<Self> {
        let registry = Registry::new();

        let route_submissions = IntCounter::new("route_submissions_total", "Routes submitted")
            .map_err(metrics_error)?;
        let route_moderations = IntCounterVec::new(
            Opts::new("route_moderations_total", "Moderation decisions by outcome"),
            &["status"],
        )
        .map_err(metrics_error)?;
        let route_searches =
            IntCounter::new("route_searches_total", "Public route searches").map_err(metrics_error)?;
        let fare_anomalies = IntCounter::new("fare_anomalies_total", "Fares flagged as anomalous")
            .map_err(metrics_error)?;

        registry
            .register(Box::new(route_submissions.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(route_moderations.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(route_searches.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(fare_anomalies.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            route_submissions,
            route_moderations,
            route_searches,
            fare_anomalies,
        })
    }

    /// Text exposition format
    pub fn render(&self) -> AppResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_error)?;
        String::from_utf8(buffer).map_err(|e| AppError::Internal(e.to_string()))
    }
}

fn metrics_error(e: prometheus::Error) -> AppError {
    AppError::Internal(format!("metrics: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.route_submissions.inc();
        metrics.route_moderations.with_label_values(&["APPROVED"]).inc();

        let text = metrics.render().unwrap();
        assert!(text.contains("route_submissions_total 1"));
        assert!(text.contains("route_moderations_total{status=\"APPROVED\"} 1"));
    }
}
