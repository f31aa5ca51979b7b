pub mod error;
pub mod health;
pub mod reports;
pub mod roles;
pub mod users;

pub use error::AppError;
