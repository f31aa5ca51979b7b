//! API request types for user operations.

use serde::{Deserialize, Serialize};

use crate::storage::EntityId;

use super::error::UserError;
use super::operations::{normalize_email, validate_email, validate_nickname};
use super::types::{NewUser, UserPatch};

/// Request payload for registering a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub nickname: String,
    /// Explicit role; the regular user role is assigned when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<EntityId>,
}

impl CreateUserRequest {
    pub fn new(email: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            nickname: nickname.into(),
            role_id: None,
        }
    }

    pub fn with_role_id(mut self, role_id: EntityId) -> Self {
        self.role_id = Some(role_id);
        self
    }

    /// Validates the request and binds it to a role.
    pub fn into_new_user(self, role_id: EntityId) -> Result<NewUser, UserError> {
        let email = normalize_email(&self.email);
        validate_email(&email)?;
        validate_nickname(&self.nickname)?;

        Ok(NewUser {
            email,
            nickname: self.nickname.trim().to_string(),
            role_id,
        })
    }
}

/// Request payload for editing a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl UpdateUserRequest {
    pub fn into_patch(self) -> Result<UserPatch, UserError> {
        let email = match self.email {
            Some(raw) => {
                let email = normalize_email(&raw);
                validate_email(&email)?;
                Some(email)
            }
            None => None,
        };
        let nickname = match self.nickname {
            Some(raw) => {
                validate_nickname(&raw)?;
                Some(raw.trim().to_string())
            }
            None => None,
        };

        Ok(UserPatch {
            email,
            nickname,
            ..UserPatch::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_new_user_normalizes() {
        let user = CreateUserRequest::new(" Ada@Example.com", " ada ")
            .into_new_user(2)
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.nickname, "ada");
        assert_eq!(user.role_id, 2);
    }

    #[test]
    fn test_into_new_user_rejects_bad_email() {
        let result = CreateUserRequest::new("not-an-email", "ada").into_new_user(2);
        assert!(matches!(result, Err(UserError::InvalidEmail(_))));
    }

    #[test]
    fn test_into_new_user_rejects_empty_nickname() {
        let result = CreateUserRequest::new("ada@example.com", "").into_new_user(2);
        assert_eq!(result, Err(UserError::EmptyNickname));
    }

    #[test]
    fn test_update_request_into_patch() {
        let patch = UpdateUserRequest {
            email: Some("NEW@example.com".to_string()),
            nickname: None,
        }
        .into_patch()
        .unwrap();

        assert_eq!(patch.email.as_deref(), Some("new@example.com"));
        assert!(patch.nickname.is_none());
        assert!(patch.coins.is_none());
    }

    #[test]
    fn test_create_request_from_json_without_role() {
        let request: CreateUserRequest =
            serde_json::from_str(r#"{"email": "ada@example.com", "nickname": "ada"}"#).unwrap();

        assert!(request.role_id.is_none());
    }
}
