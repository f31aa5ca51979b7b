use thiserror::Error;

use crate::storage::RepositoryError;

/// Errors that can occur in user and role operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("Nickname cannot be empty")]
    EmptyNickname,
    #[error("Nickname too long (max 50 characters)")]
    NicknameTooLong,
    #[error("Email already registered: {0}")]
    EmailTaken(String),
    #[error("Nickname already taken: {0}")]
    NicknameTaken(String),
    #[error("Role not found: {0}")]
    RoleNotFound(String),
    #[error("User creation failed")]
    CreationFailed,
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// Result type for user operations.
pub type Result<T> = std::result::Result<T, UserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_display() {
        assert_eq!(
            UserError::EmailTaken("ada@example.com".to_string()).to_string(),
            "Email already registered: ada@example.com"
        );
        assert_eq!(
            UserError::NicknameTaken("ada".to_string()).to_string(),
            "Nickname already taken: ada"
        );
        assert_eq!(
            UserError::RoleNotFound("admin".to_string()).to_string(),
            "Role not found: admin"
        );
        assert_eq!(
            UserError::EmptyNickname.to_string(),
            "Nickname cannot be empty"
        );
    }
}
