use chrono::Utc;

use roadwatch_core::cache::Cache;
use roadwatch_core::report::{
    next_status, validate_position, NewReport, Report, ReportError, ReportPatch, ReportStatus,
    Result,
};
use roadwatch_core::storage::{EntityId, PersistenceProvider};

use crate::storage::cached::CachedRepository;

/// Report filing, editing and moderation.
///
/// Status only moves through [`ReportRepository::transition`]; generic edits
/// that touch the status are refused.
pub struct ReportRepository<P, C> {
    reports: CachedRepository<Report, P, C>,
}

impl<P, C> ReportRepository<P, C>
where
    P: PersistenceProvider<Report>,
    C: Cache + 'static,
{
    pub fn new(reports: CachedRepository<Report, P, C>) -> Self {
        Self { reports }
    }

    /// Files a new report. It always starts `Pending`.
    pub async fn create_report(&self, draft: NewReport) -> Result<Report> {
        validate_position(&draft.position)?;

        let draft = NewReport {
            status: ReportStatus::Pending,
            ..draft
        };

        let report = self
            .reports
            .create(draft)
            .await
            .ok_or(ReportError::CreationFailed)?;

        tracing::info!(report_id = ?report.id, report_type = report.report_type.as_str(), "Report filed");
        Ok(report)
    }

    pub async fn get_report_by_id(&self, id: EntityId) -> Result<Option<Report>> {
        Ok(self.reports.get(id).await?)
    }

    pub async fn get_reports(&self) -> Result<Vec<Report>> {
        Ok(self.reports.get_all().await?)
    }

    /// Edits a report's descriptive fields.
    ///
    /// Returns `Ok(false)` when the write did not go through.
    pub async fn update_report(&self, report: &Report, patch: ReportPatch) -> Result<bool> {
        if patch.status.is_some() {
            return Err(ReportError::StatusChangeNotAllowed);
        }
        if let Some(position) = &patch.position {
            validate_position(position)?;
        }

        Ok(self.reports.update(report, patch).await)
    }

    pub async fn delete_report(&self, report: &Report) -> bool {
        self.reports.delete(report).await
    }

    /// Moves a pending report to `target` and returns its new state.
    ///
    /// The current status is read from the provider, never from the cache.
    pub async fn transition(&self, id: EntityId, target: ReportStatus) -> Result<Report> {
        let mut report = self
            .reports
            .provider()
            .find_by_primary_key(id)
            .await?
            .ok_or(ReportError::NotFound(id))?;

        let status = next_status(report.status, target)
            .map_err(|source| ReportError::Transition { id, source })?;

        let patch = ReportPatch::status(status);
        if !self.reports.update(&report, patch.clone()).await {
            return Err(ReportError::UpdateFailed(id));
        }

        patch.apply_to(&mut report, Utc::now());
        tracing::debug!(report_id = id, status = %status, "Report status changed");
        Ok(report)
    }

    /// Drops every cached report.
    pub async fn purge_cache(&self) {
        self.reports.purge().await;
    }
}
