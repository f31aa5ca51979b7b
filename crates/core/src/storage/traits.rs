use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::user::{Role, User};

use super::Result;

/// Numeric primary key assigned by the persistence provider.
///
/// Ids are monotonically assigned and never reused.
pub type EntityId = i64;

/// A persisted record that can be served through the cache layer.
///
/// The cache layer only needs the entity type name (for the key scheme),
/// the primary key, and a serde representation. It never looks at fields.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Fields required to create a new record.
    type Draft: Send + Sync;
    /// Partial update; `None` fields are left untouched.
    type Patch: Send + Sync;

    /// Lowercase type name used as the cache key prefix. Must not contain `:`.
    const ENTITY_TYPE: &'static str;

    /// Returns the primary key, or `None` for a record that was never persisted.
    fn id(&self) -> Option<EntityId>;
}

/// Durable storage for one entity type.
#[async_trait]
pub trait PersistenceProvider<E: Entity>: Send + Sync {
    /// Gets a record by its primary key.
    async fn find_by_primary_key(&self, id: EntityId) -> Result<Option<E>>;

    /// Gets every record of this type, ordered by id.
    async fn find_all(&self) -> Result<Vec<E>>;

    /// Creates a new record and returns it with its assigned id.
    async fn create(&self, draft: E::Draft) -> Result<E>;

    /// Applies a partial update to the row with the given id.
    ///
    /// Returns `false` when no row matched.
    async fn update_where(&self, id: EntityId, patch: &E::Patch) -> Result<bool>;

    /// Deletes the record. Returns `false` when no row matched.
    async fn destroy(&self, entity: &E) -> Result<bool>;

    /// Persists the full state of an already identified record.
    ///
    /// Returns `false` when no row matched.
    async fn save(&self, entity: &E) -> Result<bool>;
}

/// Uncached user lookups that do not go through the primary key.
#[async_trait]
pub trait UserDirectory: PersistenceProvider<User> {
    /// Gets a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Gets a user by their exact nickname.
    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<User>>;
}

/// Uncached role lookups that do not go through the primary key.
#[async_trait]
pub trait RoleDirectory: PersistenceProvider<Role> {
    /// Gets a role by its unique name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>>;
}
