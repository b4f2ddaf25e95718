//! Redis connection pool using deadpool-redis.
//!
//! Values are stored as JSON strings. Connections are created lazily, so
//! building a pool never touches the network; use [`RedisPool::health_check`]
//! to find out whether Redis is actually reachable.

use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Redis pool configuration
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&dipcord_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &dipcord_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Error type for Redis pool operations
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid TTL: {0}")]
    InvalidTtl(u64),
}

/// Result type for Redis pool operations
pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Managed Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
    url: String,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &redact(&self.url))
            .field("status", &self.pool.status())
            .finish()
    }
}

/// Strip credentials from a connection URL for logging
fn redact(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or(url)
}

impl RedisPool {
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        tracing::info!(
            url = %redact(&config.url),
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self {
            pool,
            url: config.url,
        })
    }

    pub fn from_config(config: &dipcord_common::RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    /// URL the pool connects to; pub/sub needs its own dedicated connection
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(RedisPoolError::GetConnection)
    }

    #[must_use]
    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// PING round trip
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Store `value` as JSON, optionally expiring after `ttl_seconds`
    pub async fn set_json<V: Serialize>(
        &self,
        key: &str,
        value: &V,
        ttl_seconds: Option<u64>,
    ) -> RedisResult<()> {
        let serialized = serde_json::to_string(value)?;
        let mut conn = self.get().await?;

        match ttl_seconds {
            Some(0) => return Err(RedisPoolError::InvalidTtl(0)),
            Some(ttl) => conn.set_ex::<_, _, ()>(key, &serialized, ttl).await?,
            None => conn.set::<_, _, ()>(key, &serialized).await?,
        }

        Ok(())
    }

    pub async fn get_json<V: DeserializeOwned>(&self, key: &str) -> RedisResult<Option<V>> {
        let mut conn = self.get().await?;
        let value: Option<String> = conn.get(key).await?;

        value
            .map(|v| serde_json::from_str(&v))
            .transpose()
            .map_err(RedisPoolError::from)
    }

    pub async fn delete(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.get().await?;
        let deleted: u32 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    pub async fn delete_many(&self, keys: &[String]) -> RedisResult<u32> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.get().await?;
        let deleted: u32 = conn.del(keys).await?;
        Ok(deleted)
    }

    /// Remaining TTL in seconds; `None` when the key is missing or never expires
    pub async fn ttl(&self, key: &str) -> RedisResult<Option<u64>> {
        let mut conn = self.get().await?;
        let ttl: i64 = conn.ttl(key).await?;
        Ok(u64::try_from(ttl).ok())
    }
}

/// Shared Redis pool wrapped in Arc for easy cloning
pub type SharedRedisPool = Arc<RedisPool>;

pub fn create_shared_pool(config: RedisPoolConfig) -> RedisResult<SharedRedisPool> {
    Ok(Arc::new(RedisPool::new(config)?))
}
