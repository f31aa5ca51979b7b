use super::error::{ReportError, TransitionError};
use super::types::{Position, Report, ReportStatus};

/// Validates that a position is a finite coordinate on Earth.
pub fn validate_position(position: &Position) -> Result<(), ReportError> {
    let Position {
        latitude,
        longitude,
    } = *position;

    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);

    if valid {
        Ok(())
    } else {
        Err(ReportError::InvalidPosition {
            latitude,
            longitude,
        })
    }
}

/// Computes the status a report moves to when `target` is requested.
///
/// Only `Pending -> Validated` and `Pending -> Rejected` are defined. A
/// terminal status never moves again, even to itself.
pub fn next_status(
    current: ReportStatus,
    target: ReportStatus,
) -> Result<ReportStatus, TransitionError> {
    if !target.is_terminal() {
        return Err(TransitionError::InvalidTarget(target));
    }
    if current.is_terminal() {
        return Err(TransitionError::AlreadyTerminal(current));
    }
    Ok(target)
}

/// Filters reports by status, keeping their order.
pub fn filter_reports_by_status(reports: &[Report], status: ReportStatus) -> Vec<&Report> {
    reports.iter().filter(|r| r.status == status).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportType, Severity};
    use chrono::Utc;

    fn report(id: i64, status: ReportStatus) -> Report {
        let now = Utc::now();
        Report {
            id: Some(id),
            date: now,
            position: Position::new(0.0, 0.0),
            report_type: ReportType::Pothole,
            severity: Severity::Medium,
            status,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_positions() {
        assert!(validate_position(&Position::new(0.0, 0.0)).is_ok());
        assert!(validate_position(&Position::new(90.0, 180.0)).is_ok());
        assert!(validate_position(&Position::new(-90.0, -180.0)).is_ok());
        assert!(validate_position(&Position::new(41.9028, 12.4964)).is_ok());
    }

    #[test]
    fn test_out_of_range_positions() {
        assert!(matches!(
            validate_position(&Position::new(90.1, 0.0)),
            Err(ReportError::InvalidPosition { .. })
        ));
        assert!(validate_position(&Position::new(0.0, -180.5)).is_err());
    }

    #[test]
    fn test_non_finite_positions() {
        assert!(validate_position(&Position::new(f64::NAN, 0.0)).is_err());
        assert!(validate_position(&Position::new(0.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_pending_moves_to_terminal_targets() {
        assert_eq!(
            next_status(ReportStatus::Pending, ReportStatus::Validated),
            Ok(ReportStatus::Validated)
        );
        assert_eq!(
            next_status(ReportStatus::Pending, ReportStatus::Rejected),
            Ok(ReportStatus::Rejected)
        );
    }

    #[test]
    fn test_terminal_status_never_moves() {
        for current in [ReportStatus::Validated, ReportStatus::Rejected] {
            for target in [ReportStatus::Validated, ReportStatus::Rejected] {
                assert_eq!(
                    next_status(current, target),
                    Err(TransitionError::AlreadyTerminal(current))
                );
            }
        }
    }

    #[test]
    fn test_pending_is_not_a_target() {
        assert_eq!(
            next_status(ReportStatus::Pending, ReportStatus::Pending),
            Err(TransitionError::InvalidTarget(ReportStatus::Pending))
        );
        assert_eq!(
            next_status(ReportStatus::Validated, ReportStatus::Pending),
            Err(TransitionError::InvalidTarget(ReportStatus::Pending))
        );
    }

    #[test]
    fn test_filter_reports_by_status() {
        let reports = vec![
            report(1, ReportStatus::Pending),
            report(2, ReportStatus::Validated),
            report(3, ReportStatus::Pending),
        ];

        let pending = filter_reports_by_status(&reports, ReportStatus::Pending);

        assert_eq!(
            pending.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![Some(1), Some(3)]
        );
        assert!(filter_reports_by_status(&reports, ReportStatus::Rejected).is_empty());
    }
}
