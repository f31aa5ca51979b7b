use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Entity, EntityId};

use super::coins::Coins;

/// Role names seeded at startup.
pub const ADMIN_ROLE: &str = "admin";
pub const USER_ROLE: &str = "user";

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<EntityId>,
    pub email: String,
    pub nickname: String,
    pub role_id: EntityId,
    pub coins: Coins,
    /// Number of this user's reports that were validated.
    pub validated: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    type Draft = NewUser;
    type Patch = UserPatch;

    const ENTITY_TYPE: &'static str = "user";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

/// A validated user ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub nickname: String,
    pub role_id: EntityId,
}

impl NewUser {
    /// Builds the persisted form with default balances.
    pub fn into_user(self, id: EntityId, now: DateTime<Utc>) -> User {
        User {
            id: Some(id),
            email: self.email,
            nickname: self.nickname,
            role_id: self.role_id,
            coins: Coins::ZERO,
            validated: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial user update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub role_id: Option<EntityId>,
    pub coins: Option<Coins>,
    pub validated: Option<i64>,
}

impl UserPatch {
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(nickname) = &self.nickname {
            user.nickname = nickname.clone();
        }
        if let Some(role_id) = self.role_id {
            user.role_id = role_id;
        }
        if let Some(coins) = self.coins {
            user.coins = coins;
        }
        if let Some(validated) = self.validated {
            user.validated = validated;
        }
        user.updated_at = now;
    }
}

/// One row of the public leaderboard. Carries no contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    /// 1-based. Users with equal coins and validated counts share a rank.
    pub rank: usize,
    pub id: Option<EntityId>,
    pub nickname: String,
    pub coins: Coins,
    pub validated: i64,
}

/// A named permission group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Option<EntityId>,
    pub name: String,
}

impl Entity for Role {
    type Draft = NewRole;
    type Patch = RolePatch;

    const ENTITY_TYPE: &'static str = "role";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub name: String,
}

impl NewRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePatch {
    pub name: Option<String>,
}

impl RolePatch {
    pub fn apply_to(&self, role: &mut Role) {
        if let Some(name) = &self.name {
            role.name = name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_user_starts_with_empty_balances() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let user = NewUser {
            email: "ada@example.com".to_string(),
            nickname: "ada".to_string(),
            role_id: 2,
        }
        .into_user(10, now);

        assert_eq!(user.id, Some(10));
        assert_eq!(user.coins, Coins::ZERO);
        assert_eq!(user.validated, 0);
        assert_eq!(user.created_at, now);
    }

    #[test]
    fn test_user_patch() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let mut user = NewUser {
            email: "ada@example.com".to_string(),
            nickname: "ada".to_string(),
            role_id: 2,
        }
        .into_user(1, now);

        UserPatch {
            coins: Some(Coins::from_cents(350)),
            ..UserPatch::default()
        }
        .apply_to(&mut user, later);

        assert_eq!(user.coins, Coins::from_cents(350));
        assert_eq!(user.nickname, "ada");
        assert_eq!(user.updated_at, later);
    }

    #[test]
    fn test_entity_type_names_are_distinct() {
        assert_eq!(User::ENTITY_TYPE, "user");
        assert_eq!(Role::ENTITY_TYPE, "role");
        assert_ne!(User::ENTITY_TYPE, crate::report::Report::ENTITY_TYPE);
    }
}
