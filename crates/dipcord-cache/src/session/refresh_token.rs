//! Refresh token storage in Redis.
//!
//! Each issued refresh token is tracked under its `jti` with a TTL equal to
//! the token's remaining lifetime. A token whose key is gone has been revoked
//! (or rotated away) and must be rejected even if its signature still checks
//! out. A per-user set lets logout revoke every session at once.

use dipcord_core::Snowflake;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::pool::{RedisPool, RedisResult};

const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";
const USER_TOKENS_PREFIX: &str = "user_tokens:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenData {
    pub user_id: Snowflake,
    /// Unix seconds
    pub issued_at: i64,
}

impl RefreshTokenData {
    #[must_use]
    pub fn new(user_id: Snowflake) -> Self {
        Self {
            user_id,
            issued_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[derive(Clone)]
pub struct RefreshTokenStore {
    pool: RedisPool,
}

impl RefreshTokenStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(jti: &str) -> String {
        format!("{REFRESH_TOKEN_PREFIX}{jti}")
    }

    fn user_key(user_id: Snowflake) -> String {
        format!("{USER_TOKENS_PREFIX}{user_id}")
    }

    /// Track `jti` for `ttl_seconds`
    pub async fn store(&self, jti: &str, user_id: Snowflake, ttl_seconds: u64) -> RedisResult<()> {
        let ttl_seconds = ttl_seconds.max(1);
        self.pool
            .set_json(&Self::key(jti), &RefreshTokenData::new(user_id), Some(ttl_seconds))
            .await?;

        // The set lives as long as the newest token in it
        let user_key = Self::user_key(user_id);
        let mut conn = self.pool.get().await?;
        conn.sadd::<_, _, ()>(&user_key, jti).await?;
        conn.expire::<_, ()>(&user_key, i64::try_from(ttl_seconds).unwrap_or(i64::MAX))
            .await?;

        tracing::debug!(user_id = %user_id, "Stored refresh token");
        Ok(())
    }

    /// `None` if the token was never stored, has expired, or was revoked
    pub async fn get(&self, jti: &str) -> RedisResult<Option<RefreshTokenData>> {
        self.pool.get_json(&Self::key(jti)).await
    }

    /// Returns whether the token was still live
    pub async fn revoke(&self, jti: &str) -> RedisResult<bool> {
        let Some(data) = self.get(jti).await? else {
            return Ok(false);
        };

        let mut conn = self.pool.get().await?;
        conn.srem::<_, _, ()>(Self::user_key(data.user_id), jti).await?;

        let deleted = self.pool.delete(&Self::key(jti)).await?;
        if deleted {
            tracing::debug!(user_id = %data.user_id, "Revoked refresh token");
        }
        Ok(deleted)
    }

    /// Swap `old_jti` for `new_jti`. Returns `false` if `old_jti` was already
    /// gone, in which case nothing is stored.
    pub async fn rotate(
        &self,
        old_jti: &str,
        new_jti: &str,
        user_id: Snowflake,
        ttl_seconds: u64,
    ) -> RedisResult<bool> {
        // DEL is atomic, so of two concurrent refreshes only one wins
        if !self.pool.delete(&Self::key(old_jti)).await? {
            return Ok(false);
        }

        let mut conn = self.pool.get().await?;
        conn.srem::<_, _, ()>(Self::user_key(user_id), old_jti).await?;

        self.store(new_jti, user_id, ttl_seconds).await?;
        Ok(true)
    }

    /// Logout everywhere. Returns how many tokens were tracked.
    pub async fn revoke_all_for_user(&self, user_id: Snowflake) -> RedisResult<u32> {
        let user_key = Self::user_key(user_id);
        let mut conn = self.pool.get().await?;

        let jtis: Vec<String> = conn.smembers(&user_key).await?;
        let mut keys: Vec<String> = jtis.iter().map(|jti| Self::key(jti)).collect();
        keys.push(user_key);
        self.pool.delete_many(&keys).await?;

        let count = u32::try_from(jtis.len()).unwrap_or(u32::MAX);
        tracing::info!(user_id = %user_id, count, "Revoked all refresh tokens for user");
        Ok(count)
    }

    /// Remaining lifetime of a tracked token
    pub async fn ttl(&self, jti: &str) -> RedisResult<Option<u64>> {
        self.pool.ttl(&Self::key(jti)).await
    }
}
