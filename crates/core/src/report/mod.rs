mod error;
mod operations;
mod requests;
mod types;

pub use error::{ReportError, Result, TransitionError};
pub use operations::{filter_reports_by_status, next_status, validate_position};
pub use requests::{
    BatchResult, BulkStatusRequest, CreateReportRequest, ListReportsQuery, UpdateReportRequest,
};
pub use types::{
    NewReport, Position, Report, ReportPatch, ReportStatus, ReportType, Severity, UnknownLabel,
};
