//! Batch moderation of reports.

mod bulk_status;
mod locks;

pub use bulk_status::BulkStatusUpdate;
pub use locks::TransitionLocks;
