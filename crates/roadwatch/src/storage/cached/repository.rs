//! Generic cache-aside repository.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use roadwatch_core::cache::{
    collection_key, deserialize_entities, deserialize_entity, entity_key, serialize_entities,
    serialize_entity, type_pattern, Cache, SerializationError,
};
use roadwatch_core::storage::{Entity, EntityId, PersistenceProvider, Result};

/// How cache populates are performed after a read miss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheWrites {
    /// Await the cache write before returning. Failures are logged.
    #[default]
    Inline,
    /// Spawn the cache write on the runtime and return immediately.
    Detached,
}

/// Cache-aside repository for one entity type.
///
/// Provider errors propagate on reads and turn into `None`/`false` on
/// writes. Cache errors are logged and never reach the caller.
///
/// Every invalidation bumps a generation counter shared by all clones. A
/// populate only lands if the generation it observed before reading the
/// provider is still current, so a slow or detached write can never put a
/// value back after the write that made it stale.
///
/// # Type Parameters
///
/// * `E` - The entity type
/// * `P` - The persistence provider for `E`
/// * `C` - The cache implementation
pub struct CachedRepository<E, P, C> {
    provider: Arc<P>,
    cache: Arc<C>,
    ttl: Option<Duration>,
    writes: CacheWrites,
    generation: Arc<RwLock<u64>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, P, C> Clone for CachedRepository<E, P, C> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
            writes: self.writes,
            generation: Arc::clone(&self.generation),
            _entity: PhantomData,
        }
    }
}

impl<E, P, C> CachedRepository<E, P, C>
where
    E: Entity,
    P: PersistenceProvider<E>,
    C: Cache + 'static,
{
    /// Creates a repository with no TTL and inline cache writes.
    pub fn new(provider: Arc<P>, cache: Arc<C>) -> Self {
        Self {
            provider,
            cache,
            ttl: None,
            writes: CacheWrites::Inline,
            generation: Arc::new(RwLock::new(0)),
            _entity: PhantomData,
        }
    }

    /// Sets the TTL passed to the cache on every populate.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_cache_writes(mut self, writes: CacheWrites) -> Self {
        self.writes = writes;
        self
    }

    /// The underlying provider, for lookups that bypass the cache.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Gets an entity by id.
    pub async fn get(&self, id: EntityId) -> Result<Option<E>> {
        let key = entity_key(E::ENTITY_TYPE, id);

        if let Some(entity) = self.read_cached(&key, deserialize_entity::<E>).await {
            return Ok(Some(entity));
        }

        let observed = *self.generation.read().await;
        let entity = self.provider.find_by_primary_key(id).await?;

        if let Some(ref e) = entity {
            self.populate(key, serialize_entity(e), observed).await;
        }

        Ok(entity)
    }

    /// Gets every entity of this type, ordered by id.
    ///
    /// Empty results are never cached.
    pub async fn get_all(&self) -> Result<Vec<E>> {
        let key = collection_key(E::ENTITY_TYPE);

        if let Some(entities) = self.read_cached(&key, deserialize_entities::<E>).await {
            return Ok(entities);
        }

        let observed = *self.generation.read().await;
        let entities = self.provider.find_all().await?;

        if !entities.is_empty() {
            self.populate(key, serialize_entities(&entities), observed).await;
        }

        Ok(entities)
    }

    /// Creates an entity. Returns `None` when the provider fails.
    pub async fn create(&self, draft: E::Draft) -> Option<E> {
        match self.provider.create(draft).await {
            Ok(entity) => {
                self.invalidate(entity.id()).await;
                tracing::debug!(entity_type = E::ENTITY_TYPE, id = ?entity.id(), "Entity created");
                Some(entity)
            }
            Err(err) => {
                tracing::error!(entity_type = E::ENTITY_TYPE, error = %err, "Failed to create entity");
                None
            }
        }
    }

    /// Applies a partial update to a persisted entity.
    ///
    /// Returns `false` without touching the provider if the entity has no id.
    pub async fn update(&self, entity: &E, patch: E::Patch) -> bool {
        let Some(id) = entity.id() else {
            tracing::warn!(entity_type = E::ENTITY_TYPE, "Refusing to update entity without id");
            return false;
        };

        let updated = match self.provider.update_where(id, &patch).await {
            Ok(updated) => updated,
            Err(err) => {
                tracing::error!(entity_type = E::ENTITY_TYPE, id, error = %err, "Failed to update entity");
                return false;
            }
        };

        if updated {
            self.invalidate(Some(id)).await;
            tracing::debug!(entity_type = E::ENTITY_TYPE, id, "Entity updated");
        } else {
            tracing::debug!(entity_type = E::ENTITY_TYPE, id, "Update matched no row");
        }
        updated
    }

    /// Deletes a persisted entity.
    pub async fn delete(&self, entity: &E) -> bool {
        let Some(id) = entity.id() else {
            tracing::warn!(entity_type = E::ENTITY_TYPE, "Refusing to delete entity without id");
            return false;
        };

        match self.provider.destroy(entity).await {
            Ok(true) => {
                self.invalidate(Some(id)).await;
                tracing::debug!(entity_type = E::ENTITY_TYPE, id, "Entity deleted");
                true
            }
            Ok(false) => false,
            Err(err) => {
                tracing::error!(entity_type = E::ENTITY_TYPE, id, error = %err, "Failed to delete entity");
                false
            }
        }
    }

    /// Persists the full in-memory state of an identified entity.
    pub async fn save(&self, entity: &E) -> bool {
        let Some(id) = entity.id() else {
            tracing::warn!(entity_type = E::ENTITY_TYPE, "Refusing to save entity without id");
            return false;
        };

        match self.provider.save(entity).await {
            Ok(true) => {
                self.invalidate(Some(id)).await;
                tracing::debug!(entity_type = E::ENTITY_TYPE, id, "Entity saved");
                true
            }
            Ok(false) => false,
            Err(err) => {
                tracing::error!(entity_type = E::ENTITY_TYPE, id, error = %err, "Failed to save entity");
                false
            }
        }
    }

    /// Drops every cached entry of this entity type.
    pub async fn purge(&self) {
        let mut generation = self.generation.write().await;
        *generation += 1;
        if let Err(err) = self.cache.delete_pattern(&type_pattern(E::ENTITY_TYPE)).await {
            tracing::warn!(entity_type = E::ENTITY_TYPE, error = %err, "Failed to purge cache");
        }
    }

    /// Reads and decodes a cached value. Any failure counts as a miss.
    async fn read_cached<T>(
        &self,
        key: &str,
        decode: fn(&[u8]) -> std::result::Result<T, SerializationError>,
    ) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(value) => {
                    tracing::trace!(key, "Cache hit");
                    Some(value)
                }
                Err(err) => {
                    tracing::warn!(key, error = %err, "Cached value is undecodable");
                    None
                }
            },
            Ok(None) => {
                tracing::trace!(key, "Cache miss");
                None
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed");
                None
            }
        }
    }

    async fn populate(
        &self,
        key: String,
        bytes: std::result::Result<Vec<u8>, SerializationError>,
        observed: u64,
    ) {
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Failed to serialize value for cache");
                return;
            }
        };

        match self.writes {
            CacheWrites::Inline => {
                store(&self.generation, observed, self.cache.as_ref(), &key, &bytes, self.ttl)
                    .await
            }
            CacheWrites::Detached => {
                let generation = Arc::clone(&self.generation);
                let cache = Arc::clone(&self.cache);
                let ttl = self.ttl;
                tokio::spawn(async move {
                    store(&generation, observed, cache.as_ref(), &key, &bytes, ttl).await;
                });
            }
        }
    }

    /// Invalidates the entity key (when known) and the collection key.
    async fn invalidate(&self, id: Option<EntityId>) {
        // Held across the deletes so no populate interleaves with them.
        let mut generation = self.generation.write().await;
        *generation += 1;

        if let Some(id) = id {
            let key = entity_key(E::ENTITY_TYPE, id);
            if let Err(err) = self.cache.delete(&key).await {
                tracing::warn!(key = %key, error = %err, "Failed to invalidate entity cache");
            }
        }

        let key = collection_key(E::ENTITY_TYPE);
        if let Err(err) = self.cache.delete(&key).await {
            tracing::warn!(key = %key, error = %err, "Failed to invalidate collection cache");
        }
    }
}

/// Writes `bytes` under `key` unless an invalidation happened since `observed`.
async fn store<C: Cache + ?Sized>(
    generation: &RwLock<u64>,
    observed: u64,
    cache: &C,
    key: &str,
    bytes: &[u8],
    ttl: Option<Duration>,
) {
    let current = generation.read().await;
    if *current != observed {
        tracing::debug!(key, "Dropping stale cache populate");
        return;
    }
    if let Err(err) = cache.set(key, bytes, ttl).await {
        tracing::warn!(key, error = %err, "Failed to populate cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use tokio::sync::RwLock;

    use roadwatch_core::cache::{CacheError, KeyPattern, Result as CacheResult};
    use roadwatch_core::storage::RepositoryError;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Option<EntityId>,
        text: String,
    }

    #[derive(Debug, Default)]
    struct NotePatch {
        text: Option<String>,
    }

    impl Entity for Note {
        type Draft = String;
        type Patch = NotePatch;

        const ENTITY_TYPE: &'static str = "note";

        fn id(&self) -> Option<EntityId> {
            self.id
        }
    }

    fn note(id: EntityId, text: &str) -> Note {
        Note {
            id: Some(id),
            text: text.to_string(),
        }
    }

    // Mock provider that counts calls and can be switched to fail
    #[derive(Default)]
    struct MockProvider {
        notes: RwLock<HashMap<EntityId, Note>>,
        next_id: AtomicI64,
        find_calls: AtomicUsize,
        find_all_calls: AtomicUsize,
        write_calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl MockProvider {
        async fn insert(&self, note: Note) {
            let id = note.id.unwrap();
            self.next_id.fetch_max(id, Ordering::SeqCst);
            self.notes.write().await.insert(id, note);
        }

        fn fail(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(RepositoryError::ConnectionFailed("database is down".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PersistenceProvider<Note> for MockProvider {
        async fn find_by_primary_key(&self, id: EntityId) -> Result<Option<Note>> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.notes.read().await.get(&id).cloned())
        }

        async fn find_all(&self) -> Result<Vec<Note>> {
            self.find_all_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let mut notes: Vec<Note> = self.notes.read().await.values().cloned().collect();
            notes.sort_by_key(|n| n.id);
            Ok(notes)
        }

        async fn create(&self, text: String) -> Result<Note> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let note = note(id, &text);
            self.notes.write().await.insert(id, note.clone());
            Ok(note)
        }

        async fn update_where(&self, id: EntityId, patch: &NotePatch) -> Result<bool> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let mut notes = self.notes.write().await;
            match notes.get_mut(&id) {
                Some(note) => {
                    if let Some(text) = &patch.text {
                        note.text = text.clone();
                    }
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn destroy(&self, note: &Note) -> Result<bool> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let Some(id) = note.id else {
                return Ok(false);
            };
            Ok(self.notes.write().await.remove(&id).is_some())
        }

        async fn save(&self, note: &Note) -> Result<bool> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let Some(id) = note.id else {
                return Ok(false);
            };
            let mut notes = self.notes.write().await;
            Ok(notes.insert(id, note.clone()).is_some())
        }
    }

    // Mock cache that can be switched to fail every operation
    #[derive(Default)]
    struct MockCache {
        store: RwLock<HashMap<String, Vec<u8>>>,
        failing: AtomicBool,
    }

    impl MockCache {
        fn failing() -> Self {
            Self {
                failing: AtomicBool::new(true),
                ..Self::default()
            }
        }

        fn check(&self) -> CacheResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(CacheError::ConnectionFailed("cache is down".to_string()));
            }
            Ok(())
        }

        async fn contains(&self, key: &str) -> bool {
            self.store.read().await.contains_key(key)
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
            self.check()?;
            Ok(self.store.read().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
            self.check()?;
            self.store
                .write()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn delete(&self, key: &str) -> CacheResult<()> {
            self.check()?;
            self.store.write().await.remove(key);
            Ok(())
        }

        async fn delete_pattern(&self, pattern: &str) -> CacheResult<()> {
            self.check()?;
            let Some(pattern) = KeyPattern::parse(pattern) else {
                return Ok(());
            };
            self.store
                .write()
                .await
                .retain(|k, _| !pattern.matches(k));
            Ok(())
        }
    }

    type NoteRepository = CachedRepository<Note, MockProvider, MockCache>;

    fn setup() -> (NoteRepository, Arc<MockProvider>, Arc<MockCache>) {
        let provider = Arc::new(MockProvider::default());
        let cache = Arc::new(MockCache::default());
        let repo = CachedRepository::new(provider.clone(), cache.clone());
        (repo, provider, cache)
    }

    // ==================== Reads ====================

    #[tokio::test]
    async fn test_get_cache_miss_populates() {
        let (repo, provider, cache) = setup();
        provider.insert(note(1, "hello")).await;

        let result = repo.get(1).await.unwrap();
        assert_eq!(result, Some(note(1, "hello")));
        assert_eq!(provider.find_calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains("note:1").await);
    }

    #[tokio::test]
    async fn test_get_cache_hit_skips_provider() {
        let (repo, provider, _cache) = setup();
        provider.insert(note(1, "hello")).await;

        repo.get(1).await.unwrap();
        let result = repo.get(1).await.unwrap();

        assert_eq!(result, Some(note(1, "hello")));
        assert_eq!(provider.find_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_cached() {
        let (repo, provider, cache) = setup();

        assert_eq!(repo.get(7).await.unwrap(), None);
        assert_eq!(repo.get(7).await.unwrap(), None);

        assert_eq!(provider.find_calls.load(Ordering::SeqCst), 2);
        assert!(!cache.contains("note:7").await);
    }

    #[tokio::test]
    async fn test_get_propagates_provider_error() {
        let (repo, provider, _cache) = setup();
        provider.fail(true);

        let result = repo.get(1).await;
        assert!(matches!(result, Err(RepositoryError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_get_undecodable_cache_falls_back_to_provider() {
        let (repo, provider, cache) = setup();
        provider.insert(note(1, "hello")).await;
        cache.set("note:1", b"not json", None).await.unwrap();

        let result = repo.get(1).await.unwrap();

        assert_eq!(result, Some(note(1, "hello")));
        assert_eq!(provider.find_calls.load(Ordering::SeqCst), 1);
        // Repopulated with a decodable value
        let bytes = cache.store.read().await.get("note:1").cloned().unwrap();
        assert_eq!(deserialize_entity::<Note>(&bytes).unwrap(), note(1, "hello"));
    }

    #[tokio::test]
    async fn test_get_all_caches_non_empty() {
        let (repo, provider, cache) = setup();
        provider.insert(note(2, "b")).await;
        provider.insert(note(1, "a")).await;

        let first = repo.get_all().await.unwrap();
        let second = repo.get_all().await.unwrap();

        assert_eq!(first, vec![note(1, "a"), note(2, "b")]);
        assert_eq!(first, second);
        assert_eq!(provider.find_all_calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains("note:all").await);
    }

    #[tokio::test]
    async fn test_get_all_empty_is_never_cached() {
        let (repo, provider, cache) = setup();

        assert!(repo.get_all().await.unwrap().is_empty());
        assert!(repo.get_all().await.unwrap().is_empty());

        assert_eq!(provider.find_all_calls.load(Ordering::SeqCst), 2);
        assert!(!cache.contains("note:all").await);
    }

    // ==================== Writes ====================

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let (repo, _provider, _cache) = setup();

        let created = repo.create("first".to_string()).await.unwrap();
        let fetched = repo.get(created.id.unwrap()).await.unwrap();

        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_create_invalidates_collection() {
        let (repo, provider, cache) = setup();
        provider.insert(note(1, "a")).await;
        repo.get_all().await.unwrap();
        assert!(cache.contains("note:all").await);

        repo.create("b".to_string()).await.unwrap();

        assert!(!cache.contains("note:all").await);
        assert_eq!(repo.get_all().await.unwrap().len(), 2);
        assert_eq!(provider.find_all_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_provider_error_returns_none() {
        let (repo, provider, _cache) = setup();
        provider.fail(true);

        assert!(repo.create("lost".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_update_never_serves_stale_value() {
        let (repo, provider, _cache) = setup();
        provider.insert(note(1, "before")).await;
        let cached = repo.get(1).await.unwrap().unwrap();

        let patch = NotePatch {
            text: Some("after".to_string()),
        };
        assert!(repo.update(&cached, patch).await);

        let fetched = repo.get(1).await.unwrap().unwrap();
        assert_eq!(fetched.text, "after");
    }

    #[tokio::test]
    async fn test_update_forces_get_all_refetch() {
        let (repo, provider, _cache) = setup();
        provider.insert(note(1, "before")).await;
        repo.get_all().await.unwrap();

        let patch = NotePatch {
            text: Some("after".to_string()),
        };
        assert!(repo.update(&note(1, "before"), patch).await);

        let all = repo.get_all().await.unwrap();
        assert_eq!(all, vec![note(1, "after")]);
        assert_eq!(provider.find_all_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_update_without_id_skips_provider() {
        let (repo, provider, _cache) = setup();
        let unsaved = Note {
            id: None,
            text: "draft".to_string(),
        };

        assert!(!repo.update(&unsaved, NotePatch::default()).await);
        assert!(!repo.delete(&unsaved).await);
        assert!(!repo.save(&unsaved).await);
        assert_eq!(provider.write_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_no_matching_row_returns_false() {
        let (repo, _provider, _cache) = setup();
        assert!(!repo.update(&note(9, "ghost"), NotePatch::default()).await);
    }

    #[tokio::test]
    async fn test_update_provider_error_returns_false() {
        let (repo, provider, _cache) = setup();
        provider.insert(note(1, "a")).await;
        provider.fail(true);

        assert!(!repo.update(&note(1, "a"), NotePatch::default()).await);
    }

    #[tokio::test]
    async fn test_delete_invalidates_both_keys() {
        let (repo, provider, cache) = setup();
        provider.insert(note(1, "a")).await;
        provider.insert(note(2, "b")).await;
        repo.get(1).await.unwrap();
        repo.get_all().await.unwrap();

        assert!(repo.delete(&note(1, "a")).await);

        assert!(!cache.contains("note:1").await);
        assert!(!cache.contains("note:all").await);
        assert_eq!(repo.get(1).await.unwrap(), None);
        assert_eq!(repo.get_all().await.unwrap(), vec![note(2, "b")]);
    }

    #[tokio::test]
    async fn test_save_invalidates_entity() {
        let (repo, provider, _cache) = setup();
        provider.insert(note(1, "a")).await;
        let mut loaded = repo.get(1).await.unwrap().unwrap();

        loaded.text = "changed".to_string();
        assert!(repo.save(&loaded).await);

        assert_eq!(repo.get(1).await.unwrap(), Some(loaded));
    }

    // ==================== Cache failures ====================

    #[tokio::test]
    async fn test_cache_failure_never_fails_reads_or_writes() {
        let provider = Arc::new(MockProvider::default());
        let cache = Arc::new(MockCache::failing());
        let repo = CachedRepository::new(provider.clone(), cache);

        let created = repo.create("resilient".to_string()).await.unwrap();
        assert_eq!(repo.get(1).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.get_all().await.unwrap(), vec![created.clone()]);
        assert!(
            repo.update(
                &created,
                NotePatch {
                    text: Some("still here".to_string())
                }
            )
            .await
        );
        assert!(repo.delete(&created).await);
    }

    #[tokio::test]
    async fn test_purge_removes_only_this_entity_type() {
        let (repo, provider, cache) = setup();
        provider.insert(note(1, "a")).await;
        repo.get(1).await.unwrap();
        repo.get_all().await.unwrap();
        cache.set("other:1", b"{}", None).await.unwrap();

        repo.purge().await;

        assert!(!cache.contains("note:1").await);
        assert!(!cache.contains("note:all").await);
        assert!(cache.contains("other:1").await);
    }

    #[tokio::test]
    async fn test_detached_writes_populate_eventually() {
        let (repo, provider, cache) = setup();
        let repo = repo.with_cache_writes(CacheWrites::Detached);
        provider.insert(note(1, "a")).await;

        repo.get(1).await.unwrap();

        for _ in 0..100 {
            if cache.contains("note:1").await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(cache.contains("note:1").await);
    }

    #[tokio::test]
    async fn test_detached_get_after_update_is_fresh() {
        let (repo, provider, _cache) = setup();
        let repo = repo.with_cache_writes(CacheWrites::Detached);
        provider.insert(note(1, "before")).await;

        // Leaves a populate of the old value in flight
        let loaded = repo.get(1).await.unwrap().unwrap();
        let patch = NotePatch {
            text: Some("after".to_string()),
        };
        assert!(repo.update(&loaded, patch).await);

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(repo.get(1).await.unwrap(), Some(note(1, "after")));
    }

    #[tokio::test]
    async fn test_detached_get_all_after_create_is_fresh() {
        let (repo, provider, _cache) = setup();
        let repo = repo.with_cache_writes(CacheWrites::Detached);
        provider.insert(note(1, "a")).await;

        assert_eq!(repo.get_all().await.unwrap().len(), 1);
        repo.create("b".to_string()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;

        let all = repo.get_all().await.unwrap();
        assert_eq!(all, vec![note(1, "a"), note(2, "b")]);
    }

    #[tokio::test]
    async fn test_detached_populate_dropped_after_purge() {
        let (repo, provider, cache) = setup();
        let repo = repo.with_cache_writes(CacheWrites::Detached);
        provider.insert(note(1, "a")).await;

        repo.get(1).await.unwrap();
        repo.purge().await;

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!cache.contains("note:1").await);
    }

    #[tokio::test]
    async fn test_clones_share_invalidations() {
        let (repo, provider, _cache) = setup();
        let repo = repo.with_cache_writes(CacheWrites::Detached);
        let other = repo.clone();
        provider.insert(note(1, "before")).await;

        repo.get(1).await.unwrap();
        let patch = NotePatch {
            text: Some("after".to_string()),
        };
        assert!(other.update(&note(1, "before"), patch).await);

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(repo.get(1).await.unwrap(), Some(note(1, "after")));
    }
}
