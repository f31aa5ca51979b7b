//! Functional core for roadwatch.
//!
//! Pure types, traits and functions shared by the server crate: the cache
//! contract and key scheme, the persistence contract, and the report and
//! user domains. Nothing in this crate performs I/O.

pub mod cache;
pub mod report;
pub mod storage;
pub mod user;
