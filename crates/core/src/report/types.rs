use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Entity, EntityId};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// The kind of road damage being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Pothole,
    Dip,
}

/// How severe the reported damage is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Moderation status of a report.
///
/// Reports start `Pending` and move once to either `Validated` or
/// `Rejected`. Both of those are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    #[default]
    Pending,
    Validated,
    Rejected,
}

impl ReportStatus {
    /// Returns true if no further transition is defined from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Validated | ReportStatus::Rejected)
    }

    /// Returns the canonical text representation (as stored and serialized).
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::Validated => "VALIDATED",
            ReportStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown enum label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label: {}", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

impl FromStr for ReportStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ReportStatus::Pending),
            "VALIDATED" => Ok(ReportStatus::Validated),
            "REJECTED" => Ok(ReportStatus::Rejected),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Pothole => "POTHOLE",
            ReportType::Dip => "DIP",
        }
    }
}

impl FromStr for ReportType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POTHOLE" => Ok(ReportType::Pothole),
            "DIP" => Ok(ReportType::Dip),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

/// A road damage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: Option<EntityId>,
    /// When the damage was observed.
    pub date: DateTime<Utc>,
    pub position: Position,
    pub report_type: ReportType,
    pub severity: Severity,
    pub status: ReportStatus,
    /// The user who filed the report, if known.
    pub user_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Report {
    type Draft = NewReport;
    type Patch = ReportPatch;

    const ENTITY_TYPE: &'static str = "report";

    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

/// A validated report ready to be persisted.
///
/// Unlike [`crate::report::CreateReportRequest`], every defaulted field is
/// already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub date: DateTime<Utc>,
    pub position: Position,
    pub report_type: ReportType,
    pub severity: Severity,
    pub status: ReportStatus,
    pub user_id: Option<EntityId>,
}

impl NewReport {
    /// Builds the persisted form of this draft with the given id and timestamp.
    pub fn into_report(self, id: EntityId, now: DateTime<Utc>) -> Report {
        Report {
            id: Some(id),
            date: self.date,
            position: self.position,
            report_type: self.report_type,
            severity: self.severity,
            status: self.status,
            user_id: self.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial report update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPatch {
    pub date: Option<DateTime<Utc>>,
    pub position: Option<Position>,
    pub report_type: Option<ReportType>,
    pub severity: Option<Severity>,
    pub status: Option<ReportStatus>,
}

impl ReportPatch {
    /// A patch that only changes the status.
    pub fn status(status: ReportStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.position.is_none()
            && self.report_type.is_none()
            && self.severity.is_none()
            && self.status.is_none()
    }

    /// Applies the patch to a report in place, bumping `updated_at`.
    pub fn apply_to(&self, report: &mut Report, now: DateTime<Utc>) {
        if let Some(date) = self.date {
            report.date = date;
        }
        if let Some(position) = self.position {
            report.position = position;
        }
        if let Some(report_type) = self.report_type {
            report.report_type = report_type;
        }
        if let Some(severity) = self.severity {
            report.severity = severity;
        }
        if let Some(status) = self.status {
            report.status = status;
        }
        report.updated_at = now;
    }
}
