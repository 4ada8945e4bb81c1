//! Keyed store configuration

use crate::config::EnvironmentConfig;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    /// Prepended to every key written to Redis
    pub key_prefix: String,
    /// How often the in-memory store drops expired entries
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: "local_route_finder".to_string(),
            sweep_interval_secs: 60,
        }
    }
}

impl From<&EnvironmentConfig> for CacheConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            redis_url: config.redis_url.clone(),
            ..Self::default()
        }
    }
}
