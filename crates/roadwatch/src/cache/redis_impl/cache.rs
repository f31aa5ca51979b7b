//! Redis cache implementation.
//!
//! Uses set-based key tracking for efficient pattern deletion without SCAN.
//! Every typed key (`<type>:<rest>`) is recorded in the Redis Set at
//! `<type>:_keys`.
//!
//! # Non-Atomicity Safety
//!
//! `set`, `delete` and `delete_pattern` issue several Redis commands each.
//! A crash between them can leave a tracking set pointing at a key that no
//! longer exists, or a key that is no longer tracked. Both are harmless:
//! DEL and SREM on missing members are no-ops, and an untracked key still
//! expires or gets overwritten by the next write.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use roadwatch_core::cache::{
    entity_type_of, tracking_key, Cache, KeyPattern, Result, TRACKING_SEGMENT,
};

use super::error::map_redis_error;

/// Redis cache backend using connection manager for pooling.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Creates a new Redis cache connection.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

/// Returns the tracking set a key belongs to, if any.
fn tracking_set_for(key: &str) -> Option<String> {
    let entity_type = entity_type_of(key)?;
    if key.ends_with(&format!(":{}", TRACKING_SEGMENT)) {
        return None;
    }
    Some(tracking_key(entity_type))
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        if let Some(set) = tracking_set_for(key) {
            conn.sadd::<_, _, ()>(&set, key)
                .await
                .map_err(map_redis_error)?;
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        if let Some(set) = tracking_set_for(key) {
            conn.srem::<_, _, ()>(&set, key)
                .await
                .map_err(map_redis_error)?;
        }

        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;

        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        // Only typed patterns are tracked; anything else would need SCAN
        let Some(pattern) = KeyPattern::parse(pattern) else {
            return Ok(());
        };
        let Some(entity_type) = pattern.entity_type() else {
            tracing::debug!(?pattern, "Untyped pattern, nothing tracked to delete");
            return Ok(());
        };

        let mut conn = self.conn.clone();
        let set = tracking_key(entity_type);

        let tracked_keys: Vec<String> = conn.smembers(&set).await.map_err(map_redis_error)?;

        let keys_to_delete: Vec<&String> = tracked_keys
            .iter()
            .filter(|k| pattern.matches(k))
            .collect();

        if !keys_to_delete.is_empty() {
            conn.del::<_, ()>(&keys_to_delete)
                .await
                .map_err(map_redis_error)?;

            conn.srem::<_, _, ()>(&set, &keys_to_delete)
                .await
                .map_err(map_redis_error)?;
        }

        Ok(())
    }
}
