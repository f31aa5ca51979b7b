use std::sync::Arc;

use roadwatch_core::cache::Cache;
use roadwatch_core::storage::{EntityId, RoleDirectory, UserDirectory};
use roadwatch_core::user::{
    normalize_email, rank_users, CreateUserRequest, RankEntry, Result, User, UserError, UserPatch,
    ADMIN_ROLE, USER_ROLE,
};

use crate::storage::cached::CachedRepository;

use super::RoleRepository;

/// User registration and lookups.
pub struct UserRepository<P, C> {
    users: CachedRepository<User, P, C>,
    roles: Arc<RoleRepository<P, C>>,
}

impl<P, C> UserRepository<P, C>
where
    P: UserDirectory + RoleDirectory,
    C: Cache + 'static,
{
    pub fn new(users: CachedRepository<User, P, C>, roles: Arc<RoleRepository<P, C>>) -> Self {
        Self { users, roles }
    }

    /// Registers a user.
    ///
    /// Without an explicit role the user gets the regular `user` role.
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        let role_id = match request.role_id {
            Some(role_id) => {
                self.roles
                    .get_role_by_id(role_id)
                    .await?
                    .ok_or_else(|| UserError::RoleNotFound(role_id.to_string()))?;
                role_id
            }
            None => self.role_id_by_name(USER_ROLE).await?,
        };

        self.register(request, role_id).await
    }

    /// Registers a user with the `admin` role.
    pub async fn create_admin(&self, request: CreateUserRequest) -> Result<User> {
        let role_id = self.role_id_by_name(ADMIN_ROLE).await?;
        self.register(request, role_id).await
    }

    pub async fn get_user_by_id(&self, id: EntityId) -> Result<Option<User>> {
        Ok(self.users.get(id).await?)
    }

    pub async fn get_users(&self) -> Result<Vec<User>> {
        Ok(self.users.get_all().await?)
    }

    /// Leaderboard over every user, built from the cached user list.
    pub async fn get_rank_list(&self) -> Result<Vec<RankEntry>> {
        Ok(rank_users(self.users.get_all().await?))
    }

    /// Looks a user up by email. Not cached.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .provider()
            .find_by_email(&normalize_email(email))
            .await?)
    }

    /// Edits a user.
    ///
    /// Returns `Ok(false)` when the write did not go through.
    pub async fn update_user(&self, user: &User, patch: UserPatch) -> Result<bool> {
        self.ensure_available(patch.email.as_deref(), patch.nickname.as_deref(), user.id)
            .await?;
        Ok(self.users.update(user, patch).await)
    }

    pub async fn delete_user(&self, user: &User) -> bool {
        self.users.delete(user).await
    }

    /// Drops every cached user.
    pub async fn purge_cache(&self) {
        self.users.purge().await;
    }

    async fn role_id_by_name(&self, name: &str) -> Result<EntityId> {
        self.roles
            .get_role_by_name(name)
            .await?
            .and_then(|role| role.id)
            .ok_or_else(|| UserError::RoleNotFound(name.to_string()))
    }

    /// Fails if `email` or `nickname` belongs to a user other than `owner`.
    async fn ensure_available(
        &self,
        email: Option<&str>,
        nickname: Option<&str>,
        owner: Option<EntityId>,
    ) -> Result<()> {
        let directory = self.users.provider();

        if let Some(email) = email {
            if let Some(found) = directory.find_by_email(email).await? {
                if found.id != owner {
                    return Err(UserError::EmailTaken(email.to_string()));
                }
            }
        }
        if let Some(nickname) = nickname {
            if let Some(found) = directory.find_by_nickname(nickname).await? {
                if found.id != owner {
                    return Err(UserError::NicknameTaken(nickname.to_string()));
                }
            }
        }
        Ok(())
    }

    async fn register(&self, request: CreateUserRequest, role_id: EntityId) -> Result<User> {
        let new_user = request.into_new_user(role_id)?;
        self.ensure_available(
            Some(new_user.email.as_str()),
            Some(new_user.nickname.as_str()),
            None,
        )
        .await?;

        let email = new_user.email.clone();
        let user = self
            .users
            .create(new_user)
            .await
            .ok_or(UserError::CreationFailed)?;

        tracing::info!(user_id = ?user.id, %email, role_id, "User registered");
        Ok(user)
    }
}
