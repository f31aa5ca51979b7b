use std::{env, time::Duration};

use crate::storage::cached::CacheWrites;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds, 0 disables expiry (default: 0)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Populate the cache from background tasks (default: true)
    pub cache_detached_writes: bool,
    /// Path to SQLite database file (default: "roadwatch.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
    /// Email of an admin account to create at startup (default: none)
    pub admin_email: Option<String>,
    /// Nickname for the seeded admin account (default: "admin")
    pub admin_nickname: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 0, no expiry)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_DETACHED_WRITES` - `true` or `false` (default: true)
    /// - `SQLITE_PATH` - SQLite database path (default: "roadwatch.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `ADMIN_EMAIL` - Admin account to seed (default: unset)
    /// - `ADMIN_NICKNAME` - Nickname of the seeded admin (default: "admin")
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(10_000),
            cache_detached_writes: env::var("CACHE_DETACHED_WRITES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "roadwatch.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            admin_nickname: env::var("ADMIN_NICKNAME").unwrap_or_else(|_| "admin".to_string()),
        }
    }

    /// Get cache TTL as a Duration, `None` when expiry is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_seconds > 0).then(|| Duration::from_secs(self.cache_ttl_seconds))
    }

    pub fn cache_writes(&self) -> CacheWrites {
        if self.cache_detached_writes {
            CacheWrites::Detached
        } else {
            CacheWrites::Inline
        }
    }

    /// Defaults with inline cache writes, independent of the environment.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            cache_ttl_seconds: 0,
            cache_max_entries: 1_000,
            cache_detached_writes: false,
            sqlite_path: ":memory:".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            admin_email: None,
            admin_nickname: "admin".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
