//! Entity repositories.
//!
//! Each repository layers the domain rules of one entity type on top of a
//! [`CachedRepository`](crate::storage::cached::CachedRepository). Reads are
//! served cache-aside; writes go through the provider and invalidate.

mod report;
mod role;
mod user;

pub use report::ReportRepository;
pub use role::RoleRepository;
pub use user::UserRepository;
