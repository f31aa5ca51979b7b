//! SQLite repository implementation.
//!
//! Implements the persistence traits from `roadwatch_core::storage` using SQLite.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use roadwatch_core::report::{NewReport, Report, ReportPatch};
use roadwatch_core::storage::{
    Entity, EntityId, PersistenceProvider, RepositoryError, Result, RoleDirectory, UserDirectory,
};
use roadwatch_core::user::{Coins, NewRole, NewUser, Role, RolePatch, User, UserPatch};

use super::conversions::{format_datetime, row_to_report, row_to_role, row_to_user};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for all entity types.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    /// Runs a single-row SELECT by id.
    async fn select_by_id<T, F>(
        &self,
        query: &'static str,
        entity_type: &'static str,
        id: EntityId,
        map_row: F,
    ) -> Result<Option<T>>
    where
        T: Send + 'static,
        F: Fn(&rusqlite::Row) -> rusqlite::Result<T> + Send + 'static,
    {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(query).map_err(wrap_err)?;
                stmt.query_row([id], map_row).optional().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, entity_type, id.to_string()))
    }

    /// Runs a single-row SELECT by a text column.
    async fn select_by_text<T, F>(
        &self,
        query: &'static str,
        entity_type: &'static str,
        value: &str,
        map_row: F,
    ) -> Result<Option<T>>
    where
        T: Send + 'static,
        F: Fn(&rusqlite::Row) -> rusqlite::Result<T> + Send + 'static,
    {
        let value = value.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(query).map_err(wrap_err)?;
                stmt.query_row([&value], map_row).optional().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, entity_type))
    }

    /// Runs an ordered SELECT over a whole table.
    async fn select_all<T, F>(
        &self,
        query: &'static str,
        entity_type: &'static str,
        map_row: F,
    ) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: Fn(&rusqlite::Row) -> rusqlite::Result<T> + Send + 'static,
    {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(query).map_err(wrap_err)?;
                let rows = stmt.query_map([], map_row).map_err(wrap_err)?;

                let mut all = Vec::new();
                for row_result in rows {
                    all.push(row_result.map_err(wrap_err)?);
                }
                Ok(all)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, entity_type))
    }

    /// Deletes a row by id. Returns `false` when no row matched.
    async fn delete_by_id(
        &self,
        query: &'static str,
        entity_type: &'static str,
        id: Option<EntityId>,
    ) -> Result<bool> {
        let Some(id) = id else {
            return Ok(false);
        };

        self.conn
            .call(move |conn| {
                let affected = conn.execute(query, [id]).map_err(wrap_err)?;
                Ok(affected > 0)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, entity_type, id.to_string()))
    }
}

// ============================================================================
// Report persistence
// ============================================================================

#[async_trait]
impl PersistenceProvider<Report> for SqliteRepository {
    async fn find_by_primary_key(&self, id: EntityId) -> Result<Option<Report>> {
        self.select_by_id(schema::SELECT_REPORT_BY_ID, Report::ENTITY_TYPE, id, row_to_report)
            .await
    }

    async fn find_all(&self) -> Result<Vec<Report>> {
        self.select_all(schema::SELECT_ALL_REPORTS, Report::ENTITY_TYPE, row_to_report)
            .await
    }

    async fn create(&self, draft: NewReport) -> Result<Report> {
        let now = Utc::now();
        let date = format_datetime(&draft.date);
        let timestamp = format_datetime(&now);
        let (latitude, longitude) = (draft.position.latitude, draft.position.longitude);
        let report_type = draft.report_type.as_str();
        let severity = draft.severity.as_str();
        let status = draft.status.as_str();
        let user_id = draft.user_id;

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_REPORT,
                    params![
                        date,
                        latitude,
                        longitude,
                        report_type,
                        severity,
                        status,
                        user_id,
                        timestamp,
                        timestamp
                    ],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, Report::ENTITY_TYPE))?;

        Ok(draft.into_report(id, now))
    }

    async fn update_where(&self, id: EntityId, patch: &ReportPatch) -> Result<bool> {
        let date = patch.date.as_ref().map(format_datetime);
        let latitude = patch.position.map(|p| p.latitude);
        let longitude = patch.position.map(|p| p.longitude);
        let report_type = patch.report_type.map(|t| t.as_str());
        let severity = patch.severity.map(|s| s.as_str());
        let status = patch.status.map(|s| s.as_str());
        let updated_at = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                let affected = conn
                    .execute(
                        schema::PATCH_REPORT,
                        params![
                            id,
                            date,
                            latitude,
                            longitude,
                            report_type,
                            severity,
                            status,
                            updated_at
                        ],
                    )
                    .map_err(wrap_err)?;
                Ok(affected > 0)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, Report::ENTITY_TYPE, id.to_string()))
    }

    async fn destroy(&self, report: &Report) -> Result<bool> {
        self.delete_by_id(schema::DELETE_REPORT, Report::ENTITY_TYPE, report.id)
            .await
    }

    async fn save(&self, report: &Report) -> Result<bool> {
        let Some(id) = report.id else {
            return Ok(false);
        };
        let date = format_datetime(&report.date);
        let (latitude, longitude) = (report.position.latitude, report.position.longitude);
        let report_type = report.report_type.as_str();
        let severity = report.severity.as_str();
        let status = report.status.as_str();
        let user_id = report.user_id;
        let updated_at = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                let affected = conn
                    .execute(
                        schema::SAVE_REPORT,
                        params![
                            id,
                            date,
                            latitude,
                            longitude,
                            report_type,
                            severity,
                            status,
                            user_id,
                            updated_at
                        ],
                    )
                    .map_err(wrap_err)?;
                Ok(affected > 0)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, Report::ENTITY_TYPE, id.to_string()))
    }
}

// ============================================================================
// User persistence
// ============================================================================

#[async_trait]
impl PersistenceProvider<User> for SqliteRepository {
    async fn find_by_primary_key(&self, id: EntityId) -> Result<Option<User>> {
        self.select_by_id(schema::SELECT_USER_BY_ID, User::ENTITY_TYPE, id, row_to_user)
            .await
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        self.select_all(schema::SELECT_ALL_USERS, User::ENTITY_TYPE, row_to_user)
            .await
    }

    async fn create(&self, draft: NewUser) -> Result<User> {
        let now = Utc::now();
        let timestamp = format_datetime(&now);
        let email = draft.email.clone();
        let nickname = draft.nickname.clone();
        let role_id = draft.role_id;

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_USER,
                    params![email, nickname, role_id, Coins::ZERO.cents(), 0_i64, timestamp, timestamp],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, User::ENTITY_TYPE))?;

        Ok(draft.into_user(id, now))
    }

    async fn update_where(&self, id: EntityId, patch: &UserPatch) -> Result<bool> {
        let patch = patch.clone();
        let updated_at = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                let affected = conn
                    .execute(
                        schema::PATCH_USER,
                        params![
                            id,
                            patch.email,
                            patch.nickname,
                            patch.role_id,
                            patch.coins.map(Coins::cents),
                            patch.validated,
                            updated_at
                        ],
                    )
                    .map_err(wrap_err)?;
                Ok(affected > 0)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, User::ENTITY_TYPE, id.to_string()))
    }

    async fn destroy(&self, user: &User) -> Result<bool> {
        self.delete_by_id(schema::DELETE_USER, User::ENTITY_TYPE, user.id)
            .await
    }

    async fn save(&self, user: &User) -> Result<bool> {
        let Some(id) = user.id else {
            return Ok(false);
        };
        let user = user.clone();
        let updated_at = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                let affected = conn
                    .execute(
                        schema::SAVE_USER,
                        params![
                            id,
                            user.email,
                            user.nickname,
                            user.role_id,
                            user.coins.cents(),
                            user.validated,
                            updated_at
                        ],
                    )
                    .map_err(wrap_err)?;
                Ok(affected > 0)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, User::ENTITY_TYPE, id.to_string()))
    }
}

#[async_trait]
impl UserDirectory for SqliteRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.select_by_text(
            schema::SELECT_USER_BY_EMAIL,
            User::ENTITY_TYPE,
            email,
            row_to_user,
        )
        .await
    }

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<User>> {
        self.select_by_text(
            schema::SELECT_USER_BY_NICKNAME,
            User::ENTITY_TYPE,
            nickname,
            row_to_user,
        )
        .await
    }
}

// ============================================================================
// Role persistence
// ============================================================================

#[async_trait]
impl PersistenceProvider<Role> for SqliteRepository {
    async fn find_by_primary_key(&self, id: EntityId) -> Result<Option<Role>> {
        self.select_by_id(schema::SELECT_ROLE_BY_ID, Role::ENTITY_TYPE, id, row_to_role)
            .await
    }

    async fn find_all(&self) -> Result<Vec<Role>> {
        self.select_all(schema::SELECT_ALL_ROLES, Role::ENTITY_TYPE, row_to_role)
            .await
    }

    async fn create(&self, draft: NewRole) -> Result<Role> {
        let name = draft.name.clone();

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(schema::INSERT_ROLE, [&name]).map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, Role::ENTITY_TYPE, draft.name.clone()))?;

        Ok(Role {
            id: Some(id),
            name: draft.name,
        })
    }

    async fn update_where(&self, id: EntityId, patch: &RolePatch) -> Result<bool> {
        let name = patch.name.clone();

        self.conn
            .call(move |conn| {
                let affected = conn
                    .execute(schema::SAVE_ROLE, params![id, name])
                    .map_err(wrap_err)?;
                Ok(affected > 0)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, Role::ENTITY_TYPE, id.to_string()))
    }

    async fn destroy(&self, role: &Role) -> Result<bool> {
        self.delete_by_id(schema::DELETE_ROLE, Role::ENTITY_TYPE, role.id)
            .await
    }

    async fn save(&self, role: &Role) -> Result<bool> {
        let Some(id) = role.id else {
            return Ok(false);
        };
        let patch = RolePatch {
            name: Some(role.name.clone()),
        };
        PersistenceProvider::<Role>::update_where(self, id, &patch).await
    }
}

#[async_trait]
impl RoleDirectory for SqliteRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.select_by_text(
            schema::SELECT_ROLE_BY_NAME,
            Role::ENTITY_TYPE,
            name,
            row_to_role,
        )
        .await
    }
}
