//! Application state.
//!
//! The storage and cache backends are fixed at compile time by feature
//! flags; [`ActiveStore`] and [`ActiveCache`] name the selected pair. One
//! store and one cache are shared by every entity repository.

use std::sync::Arc;

use roadwatch_core::storage::{Entity, PersistenceProvider};
use roadwatch_core::user::{CreateUserRequest, ADMIN_ROLE, USER_ROLE};

use crate::config::Config;
use crate::repositories::{ReportRepository, RoleRepository, UserRepository};
use crate::storage::cached::CachedRepository;
use crate::workflow::{BulkStatusUpdate, TransitionLocks};

#[cfg(feature = "inmemory")]
pub type ActiveStore = crate::storage::InMemoryRepository;

#[cfg(feature = "sqlite")]
pub type ActiveStore = crate::storage::SqliteRepository;

#[cfg(feature = "memory")]
pub type ActiveCache = crate::cache::MemoryCache;

#[cfg(feature = "redis")]
pub type ActiveCache = crate::cache::RedisCache;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<ReportRepository<ActiveStore, ActiveCache>>,
    pub users: Arc<UserRepository<ActiveStore, ActiveCache>>,
    pub roles: Arc<RoleRepository<ActiveStore, ActiveCache>>,
    pub bulk_status: Arc<BulkStatusUpdate<ActiveStore, ActiveCache>>,
}

impl AppState {
    /// Opens the configured backends and wires the repositories.
    ///
    /// Cached entries left over from a previous run are purged, then the
    /// `admin` and `user` roles are seeded. When `ADMIN_EMAIL` is set, an
    /// admin account is created unless one with that email already exists.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store = Arc::new(open_store(config).await?);
        let cache = Arc::new(open_cache(config).await?);

        let roles = Arc::new(RoleRepository::new(cached(&store, &cache, config)));
        let users = Arc::new(UserRepository::new(
            cached(&store, &cache, config),
            roles.clone(),
        ));
        let reports = Arc::new(ReportRepository::new(cached(&store, &cache, config)));
        let bulk_status = Arc::new(BulkStatusUpdate::new(
            reports.clone(),
            Arc::new(TransitionLocks::new()),
        ));

        let state = Self {
            reports,
            users,
            roles,
            bulk_status,
        };

        state.purge_caches().await;
        state.seed(config).await?;

        Ok(state)
    }

    /// Drops every cached report, user and role.
    pub async fn purge_caches(&self) {
        self.reports.purge_cache().await;
        self.users.purge_cache().await;
        self.roles.purge_cache().await;
    }

    async fn seed(&self, config: &Config) -> anyhow::Result<()> {
        for name in [ADMIN_ROLE, USER_ROLE] {
            let role = self.roles.ensure_role(name).await?;
            tracing::debug!(role_id = ?role.id, name, "Role ready");
        }

        let Some(email) = &config.admin_email else {
            return Ok(());
        };

        if self.users.get_user_by_email(email).await?.is_some() {
            tracing::debug!(%email, "Admin account already exists");
            return Ok(());
        }

        let admin = self
            .users
            .create_admin(CreateUserRequest::new(email, &config.admin_nickname))
            .await?;
        tracing::info!(user_id = ?admin.id, email = %admin.email, "Seeded admin account");

        Ok(())
    }
}

fn cached<E>(
    store: &Arc<ActiveStore>,
    cache: &Arc<ActiveCache>,
    config: &Config,
) -> CachedRepository<E, ActiveStore, ActiveCache>
where
    E: Entity,
    ActiveStore: PersistenceProvider<E>,
{
    CachedRepository::new(store.clone(), cache.clone())
        .with_ttl(config.cache_ttl())
        .with_cache_writes(config.cache_writes())
}

#[cfg(feature = "inmemory")]
async fn open_store(_config: &Config) -> anyhow::Result<ActiveStore> {
    tracing::info!("Using in-memory storage");
    Ok(ActiveStore::new())
}

#[cfg(feature = "sqlite")]
async fn open_store(config: &Config) -> anyhow::Result<ActiveStore> {
    tracing::info!(path = %config.sqlite_path, "Opening SQLite storage");
    Ok(ActiveStore::new(&config.sqlite_path).await?)
}

#[cfg(feature = "memory")]
async fn open_cache(config: &Config) -> anyhow::Result<ActiveCache> {
    tracing::info!(max_entries = config.cache_max_entries, "Using in-memory cache");
    Ok(ActiveCache::new(config.cache_max_entries))
}

#[cfg(feature = "redis")]
async fn open_cache(config: &Config) -> anyhow::Result<ActiveCache> {
    tracing::info!(url = %config.redis_url, "Connecting to Redis cache");
    Ok(ActiveCache::new(&config.redis_url).await?)
}
