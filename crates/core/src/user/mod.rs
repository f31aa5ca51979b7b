mod coins;
mod error;
mod operations;
mod requests;
mod types;

pub use coins::{Coins, ParseCoinsError};
pub use error::{Result, UserError};
pub use operations::{
    normalize_email, rank_users, validate_email, validate_nickname, MAX_NICKNAME_LEN,
};
pub use requests::{CreateUserRequest, UpdateUserRequest};
pub use types::{
    NewRole, NewUser, RankEntry, Role, RolePatch, User, UserPatch, ADMIN_ROLE, USER_ROLE,
};
