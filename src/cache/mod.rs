//! Keyed stores with expiry
//!
//! OTP codes live behind [`KeyValueStore`]. The in-memory store is used by
//! default and in tests; the Redis store when `REDIS_URL` is configured.

use std::time::Duration;

use async_trait::async_trait;

use crate::utils::errors::AppResult;

pub mod cache_config;
pub mod memory_store;
pub mod redis_client;

pub use cache_config::CacheConfig;
pub use memory_store::MemoryStore;
pub use redis_client::RedisStore;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, unless missing or expired
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value, for `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Remove and return the value under `key` in one step. Of several
    /// concurrent callers at most one gets the value.
    async fn take(&self, key: &str) -> AppResult<Option<String>>;

    /// Add one to the counter under `key` and return the new count. A new
    /// counter expires after `ttl`.
    async fn increment(&self, key: &str, ttl: Duration) -> AppResult<u64>;
}
