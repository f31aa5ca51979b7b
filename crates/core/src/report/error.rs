use thiserror::Error;

use crate::storage::{EntityId, RepositoryError};

use super::ReportStatus;

/// Errors produced by the report status rules.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Report is already {0}")]
    AlreadyTerminal(ReportStatus),
    #[error("Cannot transition a report to {0}")]
    InvalidTarget(ReportStatus),
}

/// Errors that can occur in report operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReportError {
    #[error("Invalid position: latitude {latitude}, longitude {longitude}")]
    InvalidPosition { latitude: f64, longitude: f64 },
    #[error("Report status can only change through validation or rejection")]
    StatusChangeNotAllowed,
    #[error("Report creation failed")]
    CreationFailed,
    #[error("Report not found: {0}")]
    NotFound(EntityId),
    #[error("Report {id}: {source}")]
    Transition {
        id: EntityId,
        #[source]
        source: TransitionError,
    },
    #[error("Report {0} could not be updated")]
    UpdateFailed(EntityId),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
