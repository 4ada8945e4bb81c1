use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::{debug, info};

use super::{CacheConfig, KeyValueStore};
use crate::utils::errors::{AppError, AppResult};

/// Redis-backed keyed store sharing one multiplexed connection
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    pub async fn connect(redis_url: &str, config: &CacheConfig) -> anyhow::Result<Self> {
        info!("🔗 Connecting to Redis");

        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;

        let mut conn = manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        info!("✅ Redis connected");
        Ok(Self {
            manager,
            key_prefix: config.key_prefix.clone(),
        })
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

fn cache_error(e: redis::RedisError) -> AppError {
    AppError::Cache(e.to_string())
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(self.make_key(key)).await.map_err(cache_error)?;
        debug!("📥 Redis GET {} ({})", key, if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.manager.clone();
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(self.make_key(key), value, seconds)
            .await
            .map_err(cache_error)?;
        debug!("💾 Redis SET {} (TTL: {}s)", key, seconds);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(self.make_key(key)).await.map_err(cache_error)?;
        Ok(())
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.manager.clone();
        // GETDEL needs Redis 6.2+
        let value: Option<String> = redis::cmd("GETDEL")
            .arg(self.make_key(key))
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(value)
    }

    async fn increment(&self, key: &str, ttl: Duration) -> AppResult<u64> {
        let mut conn = self.manager.clone();
        let key = self.make_key(key);
        let count: u64 = conn.incr(&key, 1u64).await.map_err(cache_error)?;
        if count == 1 {
            let _: i64 = redis::cmd("EXPIRE")
                .arg(&key)
                .arg(ttl.as_secs().max(1))
                .query_async(&mut conn)
                .await
                .map_err(cache_error)?;
        }
        Ok(count)
    }
}
