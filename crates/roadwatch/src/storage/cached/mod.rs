//! Cached repository layer.
//!
//! `CachedRepository` wraps a `PersistenceProvider` with the cache-aside
//! pattern, for any entity type:
//!
//! - **Reads**: Check cache first, on miss fetch from the provider and populate cache
//! - **Writes**: Persist through the provider, then invalidate the entity and
//!   collection keys
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteRepository::new("roadwatch.db").await?);
//! let cache = Arc::new(MemoryCache::new(10_000));
//!
//! let reports: CachedRepository<Report, _, _> = CachedRepository::new(store, cache)
//!     .with_cache_writes(CacheWrites::Detached);
//! ```

mod repository;

pub use repository::{CacheWrites, CachedRepository};
