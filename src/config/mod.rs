//! Configuration
//!
//! Environment settings and database pool sizing.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::EnvironmentConfig;
