//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use roadwatch_core::report::{NewReport, Report, ReportPatch};
use roadwatch_core::storage::{
    Entity, EntityId, PersistenceProvider, RepositoryError, Result, RoleDirectory, UserDirectory,
};
use roadwatch_core::user::{NewRole, NewUser, Role, RolePatch, User, UserPatch};

/// One table: rows keyed by id plus a monotonic id sequence.
#[derive(Debug)]
struct Table<T> {
    rows: RwLock<HashMap<EntityId, T>>,
    next_id: AtomicI64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<T: Clone + Entity> Table<T> {
    /// Ids are never reused, even after deletes.
    fn allocate_id(&self) -> EntityId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn get(&self, id: EntityId) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn all(&self) -> Vec<T> {
        let rows = self.rows.read().await;
        let mut all: Vec<T> = rows.values().cloned().collect();
        all.sort_by_key(|row| row.id());
        all
    }

    async fn remove(&self, entity: &T) -> bool {
        let Some(id) = entity.id() else {
            return false;
        };
        self.rows.write().await.remove(&id).is_some()
    }

    async fn replace(&self, entity: &T) -> bool {
        let Some(id) = entity.id() else {
            return false;
        };
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(row) => {
                *row = entity.clone();
                true
            }
            None => false,
        }
    }
}

/// In-memory storage backend.
///
/// Data is not persisted and will be lost when the repository is dropped.
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    reports: Arc<Table<Report>>,
    users: Arc<Table<User>>,
    roles: Arc<Table<Role>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(email: &str) -> RepositoryError {
    RepositoryError::AlreadyExists {
        entity_type: User::ENTITY_TYPE,
        id: email.to_string(),
    }
}

/// Rejects an email or nickname already used by a user other than `except`.
fn check_user_unique(
    users: &HashMap<EntityId, User>,
    email: Option<&str>,
    nickname: Option<&str>,
    except: Option<EntityId>,
) -> Result<()> {
    for user in users.values().filter(|u| u.id != except) {
        if email.is_some_and(|e| e == user.email) {
            return Err(email_taken(&user.email));
        }
        if nickname.is_some_and(|n| n == user.nickname) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: User::ENTITY_TYPE,
                id: user.nickname.clone(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl PersistenceProvider<Report> for InMemoryRepository {
    async fn find_by_primary_key(&self, id: EntityId) -> Result<Option<Report>> {
        Ok(self.reports.get(id).await)
    }

    async fn find_all(&self) -> Result<Vec<Report>> {
        Ok(self.reports.all().await)
    }

    async fn create(&self, draft: NewReport) -> Result<Report> {
        let id = self.reports.allocate_id();
        let report = draft.into_report(id, Utc::now());
        self.reports.rows.write().await.insert(id, report.clone());
        Ok(report)
    }

    async fn update_where(&self, id: EntityId, patch: &ReportPatch) -> Result<bool> {
        let mut rows = self.reports.rows.write().await;
        match rows.get_mut(&id) {
            Some(report) => {
                patch.apply_to(report, Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn destroy(&self, report: &Report) -> Result<bool> {
        Ok(self.reports.remove(report).await)
    }

    async fn save(&self, report: &Report) -> Result<bool> {
        Ok(self.reports.replace(report).await)
    }
}

#[async_trait]
impl PersistenceProvider<User> for InMemoryRepository {
    async fn find_by_primary_key(&self, id: EntityId) -> Result<Option<User>> {
        Ok(self.users.get(id).await)
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(self.users.all().await)
    }

    async fn create(&self, draft: NewUser) -> Result<User> {
        let mut rows = self.users.rows.write().await;
        check_user_unique(&rows, Some(&draft.email), Some(&draft.nickname), None)?;

        let id = self.users.allocate_id();
        let user = draft.into_user(id, Utc::now());
        rows.insert(id, user.clone());
        Ok(user)
    }

    async fn update_where(&self, id: EntityId, patch: &UserPatch) -> Result<bool> {
        let mut rows = self.users.rows.write().await;
        check_user_unique(
            &rows,
            patch.email.as_deref(),
            patch.nickname.as_deref(),
            Some(id),
        )?;

        match rows.get_mut(&id) {
            Some(user) => {
                patch.apply_to(user, Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn destroy(&self, user: &User) -> Result<bool> {
        Ok(self.users.remove(user).await)
    }

    async fn save(&self, user: &User) -> Result<bool> {
        {
            let rows = self.users.rows.read().await;
            check_user_unique(&rows, Some(&user.email), Some(&user.nickname), user.id)?;
        }
        Ok(self.users.replace(user).await)
    }
}

#[async_trait]
impl UserDirectory for InMemoryRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let rows = self.users.rows.read().await;
        Ok(rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<User>> {
        let rows = self.users.rows.read().await;
        Ok(rows.values().find(|u| u.nickname == nickname).cloned())
    }
}

#[async_trait]
impl PersistenceProvider<Role> for InMemoryRepository {
    async fn find_by_primary_key(&self, id: EntityId) -> Result<Option<Role>> {
        Ok(self.roles.get(id).await)
    }

    async fn find_all(&self) -> Result<Vec<Role>> {
        Ok(self.roles.all().await)
    }

    async fn create(&self, draft: NewRole) -> Result<Role> {
        let mut rows = self.roles.rows.write().await;
        if rows.values().any(|r| r.name == draft.name) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: Role::ENTITY_TYPE,
                id: draft.name,
            });
        }

        let id = self.roles.allocate_id();
        let role = Role {
            id: Some(id),
            name: draft.name,
        };
        rows.insert(id, role.clone());
        Ok(role)
    }

    async fn update_where(&self, id: EntityId, patch: &RolePatch) -> Result<bool> {
        let mut rows = self.roles.rows.write().await;
        match rows.get_mut(&id) {
            Some(role) => {
                patch.apply_to(role);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn destroy(&self, role: &Role) -> Result<bool> {
        Ok(self.roles.remove(role).await)
    }

    async fn save(&self, role: &Role) -> Result<bool> {
        Ok(self.roles.replace(role).await)
    }
}

#[async_trait]
impl RoleDirectory for InMemoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let rows = self.roles.rows.read().await;
        Ok(rows.values().find(|r| r.name == name).cloned())
    }
}
