//! In-memory storage backend.
//!
//! Stores every entity type in HashMaps wrapped in `Arc<RwLock<_>>`. Useful
//! for tests and local development where persistence is not required.
//!
//! # Example
//!
//! ```rust,ignore
//! use roadwatch::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! let report = repo.create(new_report).await?;
//! ```

mod repository;

pub use repository::InMemoryRepository;
