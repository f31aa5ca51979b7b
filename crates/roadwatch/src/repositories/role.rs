use roadwatch_core::cache::Cache;
use roadwatch_core::storage::{EntityId, RepositoryError, Result, RoleDirectory};
use roadwatch_core::user::{NewRole, Role};

use crate::storage::cached::CachedRepository;

/// Role lookups and startup seeding.
pub struct RoleRepository<P, C> {
    roles: CachedRepository<Role, P, C>,
}

impl<P, C> RoleRepository<P, C>
where
    P: RoleDirectory,
    C: Cache + 'static,
{
    pub fn new(roles: CachedRepository<Role, P, C>) -> Self {
        Self { roles }
    }

    /// Looks a role up by name. Not cached.
    pub async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.roles.provider().find_by_name(name).await
    }

    pub async fn get_role_by_id(&self, id: EntityId) -> Result<Option<Role>> {
        self.roles.get(id).await
    }

    pub async fn get_roles(&self) -> Result<Vec<Role>> {
        self.roles.get_all().await
    }

    /// Returns the named role, creating it first if it does not exist.
    pub async fn ensure_role(&self, name: &str) -> Result<Role> {
        if let Some(role) = self.get_role_by_name(name).await? {
            return Ok(role);
        }

        if let Some(role) = self.roles.create(NewRole::new(name)).await {
            tracing::info!(role = %role.name, id = ?role.id, "Role seeded");
            return Ok(role);
        }

        // Another caller may have created it in between
        self.get_role_by_name(name)
            .await?
            .ok_or_else(|| RepositoryError::QueryFailed(format!("Could not create role {name}")))
    }

    /// Drops every cached role.
    pub async fn purge_cache(&self) {
        self.roles.purge().await;
    }
}
