use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Trait for basic cache operations.
///
/// Keys are plain strings built with the functions in this module; values
/// are opaque bytes. Implementations decide how (and whether) to honor the
/// TTL.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes all values matching a [`KeyPattern`](super::KeyPattern) such as `report:*`.
    ///
    /// Unparseable patterns match nothing.
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;
}
