//! API request and response types for report operations.
//!
//! Following the Functional Core pattern, these are pure data types with no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::EntityId;

use super::error::ReportError;
use super::operations::validate_position;
use super::types::{NewReport, Position, ReportPatch, ReportStatus, ReportType, Severity};

/// Request payload for filing a new report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReportRequest {
    /// Observation time; defaults to the time of creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    pub position: Position,
    pub report_type: ReportType,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
}

impl CreateReportRequest {
    pub fn new(position: Position, report_type: ReportType, severity: Severity) -> Self {
        Self {
            date: None,
            position,
            report_type,
            severity,
            user_id: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_user_id(mut self, user_id: EntityId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Validates the request and resolves defaults.
    ///
    /// A missing date becomes `now`; new reports always start `Pending`.
    pub fn into_new_report(self, now: DateTime<Utc>) -> Result<NewReport, ReportError> {
        validate_position(&self.position)?;

        Ok(NewReport {
            date: self.date.unwrap_or(now),
            position: self.position,
            report_type: self.report_type,
            severity: self.severity,
            status: ReportStatus::Pending,
            user_id: self.user_id,
        })
    }
}

/// Request payload for editing a report. Status is not editable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateReportRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<ReportType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl UpdateReportRequest {
    /// Validates the request and converts it into a patch.
    pub fn into_patch(self) -> Result<ReportPatch, ReportError> {
        if let Some(position) = &self.position {
            validate_position(position)?;
        }

        Ok(ReportPatch {
            date: self.date,
            position: self.position,
            report_type: self.report_type,
            severity: self.severity,
            status: None,
        })
    }
}

/// Query parameters for listing reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListReportsQuery {
    #[serde(default)]
    pub status: Option<ReportStatus>,
}

/// Request payload for approving and rejecting many reports at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkStatusRequest {
    #[serde(default)]
    pub validate: Vec<EntityId>,
    #[serde(default)]
    pub reject: Vec<EntityId>,
}

/// Ids whose transition succeeded, partitioned by target status.
///
/// Ids missing from both lists failed; the cause is only logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub validated: Vec<EntityId>,
    pub rejected: Vec<EntityId>,
}

impl BatchResult {
    /// Total number of ids that transitioned.
    pub fn len(&self) -> usize {
        self.validated.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
