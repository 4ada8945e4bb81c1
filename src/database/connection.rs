//! PostgreSQL connection
//!
//! Opens the pool and brings the schema up to date.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    info!("🗄️ Connecting to PostgreSQL at {}", mask_database_url(&config.url));

    let pool = config
        .create_pool()
        .await
        .context("could not connect to PostgreSQL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("could not apply migrations")?;

    info!("✅ Database ready");
    Ok(pool)
}

/// Hide credentials before a URL reaches the logs
fn mask_database_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    match url.rfind('@') {
        Some(at_pos) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
