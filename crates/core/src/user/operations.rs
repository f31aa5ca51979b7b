use std::cmp::Reverse;

use super::error::UserError;
use super::types::{RankEntry, User};

/// Maximum nickname length in characters.
pub const MAX_NICKNAME_LEN: usize = 50;

/// Trims and lowercases an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates the shape of an (already normalized) email address.
///
/// This is a structural check only: one `@`, a non-empty local part, and a
/// domain containing a dot that is neither leading nor trailing.
pub fn validate_email(email: &str) -> Result<(), UserError> {
    let invalid = || UserError::InvalidEmail(email.to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

/// Validates a nickname.
pub fn validate_nickname(nickname: &str) -> Result<(), UserError> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        return Err(UserError::EmptyNickname);
    }
    if trimmed.chars().count() > MAX_NICKNAME_LEN {
        return Err(UserError::NicknameTooLong);
    }
    Ok(())
}

/// Orders users for the leaderboard: most coins first, then most validated
/// reports, then oldest account.
pub fn rank_users(mut users: Vec<User>) -> Vec<RankEntry> {
    users.sort_by_key(|u| (Reverse(u.coins), Reverse(u.validated), u.id));

    let mut ranked: Vec<RankEntry> = Vec::with_capacity(users.len());
    for (position, user) in users.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(prev) if prev.coins == user.coins && prev.validated == user.validated => prev.rank,
            _ => position + 1,
        };
        ranked.push(RankEntry {
            rank,
            id: user.id,
            nickname: user.nickname,
            coins: user.coins,
            validated: user.validated,
        });
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::user::{Coins, NewUser};

    fn user(id: i64, coins: i64, validated: i64) -> User {
        let mut user = NewUser {
            email: format!("u{id}@example.com"),
            nickname: format!("u{id}"),
            role_id: 2,
        }
        .into_user(id, Utc::now());
        user.coins = Coins::from_cents(coins);
        user.validated = validated;
        user
    }

    #[test]
    fn test_rank_users_orders_by_coins_then_validated() {
        let ranked = rank_users(vec![user(1, 100, 1), user(2, 500, 0), user(3, 100, 4)]);

        let ids: Vec<_> = ranked.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(2), Some(3), Some(1)]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
        assert_eq!(ranked[0].coins.to_string(), "5.00");
    }

    #[test]
    fn test_rank_users_ties_share_a_rank() {
        let ranked = rank_users(vec![user(4, 0, 0), user(1, 250, 2), user(2, 250, 2), user(3, 10, 0)]);

        let ranks: Vec<_> = ranked.iter().map(|e| (e.id, e.rank)).collect();
        assert_eq!(
            ranks,
            vec![(Some(1), 1), (Some(2), 1), (Some(3), 3), (Some(4), 4)]
        );
    }

    #[test]
    fn test_rank_users_empty() {
        assert!(rank_users(Vec::new()).is_empty());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("a.b+c@mail.example.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        for email in [
            "",
            "ada",
            "@example.com",
            "ada@",
            "ada@example",
            "ada@.com",
            "ada@example.",
            "ada@@example.com",
            "a da@example.com",
        ] {
            assert_eq!(
                validate_email(email),
                Err(UserError::InvalidEmail(email.to_string())),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn test_nickname_rules() {
        assert!(validate_nickname("ada").is_ok());
        assert_eq!(validate_nickname("   "), Err(UserError::EmptyNickname));
        assert_eq!(
            validate_nickname(&"x".repeat(MAX_NICKNAME_LEN + 1)),
            Err(UserError::NicknameTooLong)
        );
        assert!(validate_nickname(&"x".repeat(MAX_NICKNAME_LEN)).is_ok());
    }
}
