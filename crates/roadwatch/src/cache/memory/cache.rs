//! In-memory cache implementation with LRU eviction.
//!
//! Provides a thread-safe in-memory cache with TTL support using
//! tokio synchronization primitives and LRU eviction policy.
//!
//! This implementation mirrors the Redis cache behavior for consistency:
//! - Every typed key (`<type>:<rest>`) is tracked under its entity type
//! - `delete_pattern` for a typed pattern only inspects that type's keys
//! - Deleting, expiring or evicting a key removes it from tracking

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use roadwatch_core::cache::{entity_type_of, Cache, KeyPattern, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Thread-safe cache using `Arc<RwLock<LruCache>>` for concurrent access.
/// Supports TTL with lazy expiration. Uses LRU eviction to limit memory
/// usage when `max_entries` is reached.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    /// Main key-value store with LRU eviction.
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    /// Maps entity type -> set of cache keys written for that type.
    tracking: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache with LRU eviction.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            tracking: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn untrack_key(&self, key: &str) {
        if let Some(entity_type) = entity_type_of(key) {
            self.untrack(entity_type, &[key.to_string()]).await;
        }
    }

    async fn untrack(&self, entity_type: &str, keys: &[String]) {
        let mut tracking = self.tracking.write().await;
        if let Some(tracked) = tracking.get_mut(entity_type) {
            for key in keys {
                tracked.remove(key);
            }
            if tracked.is_empty() {
                tracking.remove(entity_type);
            }
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        {
            let mut store = self.store.write().await;
            match store.get(key) {
                Some(entry) if entry.is_expired() => {
                    store.pop(key);
                }
                Some(entry) => return Ok(Some(entry.value.clone())),
                None => return Ok(None),
            }
        }

        // Expired
        self.untrack_key(key).await;
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let evicted = {
            let mut store = self.store.write().await;
            store
                .push(key.to_string(), CacheEntry::new(value.to_vec(), ttl))
                .map(|(evicted, _)| evicted)
                .filter(|evicted| evicted != key)
        };

        if let Some(evicted) = evicted {
            self.untrack_key(&evicted).await;
        }

        if let Some(entity_type) = entity_type_of(key) {
            let mut tracking = self.tracking.write().await;
            tracking
                .entry(entity_type.to_string())
                .or_default()
                .insert(key.to_string());
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.untrack_key(key).await;

        let mut store = self.store.write().await;
        store.pop(key);

        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let Some(pattern) = KeyPattern::parse(pattern) else {
            tracing::debug!(pattern, "Ignoring unparseable cache pattern");
            return Ok(());
        };

        let Some(entity_type) = pattern.entity_type() else {
            // Untyped pattern: full scan
            let keys_to_delete: Vec<String> = {
                let mut store = self.store.write().await;
                let keys: Vec<String> = store
                    .iter()
                    .filter(|(key, _)| pattern.matches(key))
                    .map(|(key, _)| key.clone())
                    .collect();
                for key in &keys {
                    store.pop(key);
                }
                keys
            };
            for key in &keys_to_delete {
                self.untrack_key(key).await;
            }
            return Ok(());
        };

        let keys_to_delete: Vec<String> = {
            let tracking = self.tracking.read().await;
            tracking
                .get(entity_type)
                .map(|keys| {
                    keys.iter()
                        .filter(|k| pattern.matches(k))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        if keys_to_delete.is_empty() {
            return Ok(());
        }

        {
            let mut store = self.store.write().await;
            for key in &keys_to_delete {
                store.pop(key);
            }
        }
        self.untrack(entity_type, &keys_to_delete).await;

        Ok(())
    }
}
