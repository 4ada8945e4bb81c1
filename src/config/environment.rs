//! Environment configuration
//!
//! Every setting has a development default; `from_env` overlays whatever is
//! set in the process environment (after `.env` has been loaded).

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    /// User token lifetime, seconds
    pub jwt_expiration: u64,
    /// Admin token lifetime, seconds
    pub admin_jwt_expiration: u64,
    pub admin_username: Option<String>,
    pub admin_password_hash: Option<String>,
    /// When false, moderation endpoints are open to anonymous callers
    pub admin_auth_required: bool,
    pub cors_origins: Vec<String>,
    /// Take the client address from `x-forwarded-for` (behind a reverse proxy)
    pub trust_proxy: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    pub auth_rate_limit_requests: u32,
    pub auth_rate_limit_window: u64,
    pub otp_ttl_seconds: u64,
    pub max_concurrent_requests: usize,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 4000,
            database_url: None,
            database_max_connections: 10,
            redis_url: None,
            jwt_secret: "dev_secret_change_me".to_string(),
            jwt_expiration: 7 * 24 * 60 * 60,
            admin_jwt_expiration: 24 * 60 * 60,
            admin_username: None,
            admin_password_hash: None,
            admin_auth_required: true,
            cors_origins: Vec::new(),
            trust_proxy: false,
            rate_limit_requests: 100,
            rate_limit_window: 60,
            auth_rate_limit_requests: 10,
            auth_rate_limit_window: 15 * 60,
            otp_ttl_seconds: 300,
            max_concurrent_requests: 512,
        }
    }
}

fn string_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match string_var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a valid value, got '{}'", key, raw)),
        None => Ok(default),
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            environment: string_var("ENVIRONMENT").unwrap_or(defaults.environment),
            host: string_var("HOST").unwrap_or(defaults.host),
            port: parsed_var("PORT", defaults.port)?,
            database_url: string_var("DATABASE_URL"),
            database_max_connections: parsed_var(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            redis_url: string_var("REDIS_URL"),
            jwt_secret: string_var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiration: parsed_var("JWT_EXPIRATION", defaults.jwt_expiration)?,
            admin_jwt_expiration: parsed_var("ADMIN_JWT_EXPIRATION", defaults.admin_jwt_expiration)?,
            admin_username: string_var("ADMIN_USERNAME"),
            admin_password_hash: string_var("ADMIN_PASSWORD_HASH"),
            admin_auth_required: parsed_var("ADMIN_AUTH_REQUIRED", defaults.admin_auth_required)?,
            cors_origins: string_var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            trust_proxy: parsed_var("TRUST_PROXY", defaults.trust_proxy)?,
            rate_limit_requests: parsed_var("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests)?,
            rate_limit_window: parsed_var("RATE_LIMIT_WINDOW", defaults.rate_limit_window)?,
            auth_rate_limit_requests: parsed_var(
                "AUTH_RATE_LIMIT_REQUESTS",
                defaults.auth_rate_limit_requests,
            )?,
            auth_rate_limit_window: parsed_var("AUTH_RATE_LIMIT_WINDOW", defaults.auth_rate_limit_window)?,
            otp_ttl_seconds: parsed_var("OTP_TTL_SECONDS", defaults.otp_ttl_seconds)?,
            max_concurrent_requests: parsed_var(
                "MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            )?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
