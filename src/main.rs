use anyhow::Result;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use local_route_finder::config::EnvironmentConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EnvironmentConfig::from_env()?;
    local_route_finder::start_server(config).await
}
