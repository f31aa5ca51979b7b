//! Bulk approve/reject of reports.

use std::collections::HashSet;
use std::sync::Arc;

use roadwatch_core::cache::Cache;
use roadwatch_core::report::{BatchResult, Report, ReportStatus};
use roadwatch_core::storage::{EntityId, PersistenceProvider};

use crate::repositories::ReportRepository;

use super::TransitionLocks;

/// Ids a batch will actually process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BatchPlan {
    pub validate: Vec<EntityId>,
    pub reject: Vec<EntityId>,
    /// Ids requested in both sets. They are processed in neither.
    pub conflicting: Vec<EntityId>,
}

/// Deduplicates both sets (keeping first occurrences) and drops ids that
/// appear in both.
pub(crate) fn plan_batch(to_validate: &[EntityId], to_reject: &[EntityId]) -> BatchPlan {
    let validate_set: HashSet<EntityId> = to_validate.iter().copied().collect();
    let reject_set: HashSet<EntityId> = to_reject.iter().copied().collect();

    let mut conflicting: Vec<EntityId> = to_validate
        .iter()
        .copied()
        .filter(|id| reject_set.contains(id))
        .collect();
    dedup_in_order(&mut conflicting);

    let keep = |ids: &[EntityId], other: &HashSet<EntityId>| {
        let mut kept: Vec<EntityId> = ids
            .iter()
            .copied()
            .filter(|id| !other.contains(id))
            .collect();
        dedup_in_order(&mut kept);
        kept
    };

    BatchPlan {
        validate: keep(to_validate, &reject_set),
        reject: keep(to_reject, &validate_set),
        conflicting,
    }
}

fn dedup_in_order(ids: &mut Vec<EntityId>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

/// Validates and rejects many reports, isolating failures per report.
///
/// The two sets run concurrently; each set is processed in input order.
/// Every transition holds the report's lock from [`TransitionLocks`], so
/// concurrent batches never move the same report twice.
pub struct BulkStatusUpdate<P, C> {
    reports: Arc<ReportRepository<P, C>>,
    locks: Arc<TransitionLocks>,
}

impl<P, C> BulkStatusUpdate<P, C>
where
    P: PersistenceProvider<Report>,
    C: Cache + 'static,
{
    pub fn new(reports: Arc<ReportRepository<P, C>>, locks: Arc<TransitionLocks>) -> Self {
        Self { reports, locks }
    }

    /// Runs the batch and returns the ids that transitioned.
    ///
    /// Failures (missing report, terminal status, persistence error) are
    /// logged and leave the id out of the result. Nothing is rolled back.
    pub async fn execute(&self, to_validate: &[EntityId], to_reject: &[EntityId]) -> BatchResult {
        let plan = plan_batch(to_validate, to_reject);

        if !plan.conflicting.is_empty() {
            tracing::warn!(
                ids = ?plan.conflicting,
                "Reports requested for both validation and rejection, skipping"
            );
        }

        let (validated, rejected) = tokio::join!(
            self.apply_all(&plan.validate, ReportStatus::Validated),
            self.apply_all(&plan.reject, ReportStatus::Rejected),
        );

        let result = BatchResult {
            validated,
            rejected,
        };

        tracing::info!(
            requested = to_validate.len() + to_reject.len(),
            validated = result.validated.len(),
            rejected = result.rejected.len(),
            "Bulk status update finished"
        );

        result
    }

    async fn apply_all(&self, ids: &[EntityId], target: ReportStatus) -> Vec<EntityId> {
        let mut done = Vec::with_capacity(ids.len());

        for &id in ids {
            let _guard = self.locks.lock(id).await;

            match self.reports.transition(id, target).await {
                Ok(_) => done.push(id),
                Err(err) => {
                    tracing::warn!(
                        report_id = id,
                        target = %target,
                        error = %err,
                        "Report not transitioned"
                    );
                }
            }
        }

        done
    }
}


#[cfg(all(test, feature = "inmemory", feature = "memory"))]
mod workflow_tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use roadwatch_core::report::{NewReport, Position, ReportType, Severity};

    use crate::cache::MemoryCache;
    use crate::storage::cached::{CacheWrites, CachedRepository};
    use crate::storage::InMemoryRepository;

    type Reports = ReportRepository<InMemoryRepository, MemoryCache>;

    async fn setup(
        count: usize,
    ) -> (BulkStatusUpdate<InMemoryRepository, MemoryCache>, Arc<Reports>) {
        setup_with(count, CacheWrites::Inline).await
    }

    async fn setup_with(
        count: usize,
        writes: CacheWrites,
    ) -> (BulkStatusUpdate<InMemoryRepository, MemoryCache>, Arc<Reports>) {
        let store = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MemoryCache::new(100));
        let reports = Arc::new(ReportRepository::new(
            CachedRepository::new(store, cache).with_cache_writes(writes),
        ));

        for _ in 0..count {
            reports
                .create_report(NewReport {
                    date: Utc::now(),
                    position: Position::new(40.85, 14.27),
                    report_type: ReportType::Dip,
                    severity: Severity::Medium,
                    status: ReportStatus::Pending,
                    user_id: None,
                })
                .await
                .unwrap();
        }

        let workflow = BulkStatusUpdate::new(reports.clone(), Arc::new(TransitionLocks::new()));
        (workflow, reports)
    }

    async fn status_of(reports: &Reports, id: EntityId) -> Option<ReportStatus> {
        reports
            .get_report_by_id(id)
            .await
            .unwrap()
            .map(|r| r.status)
    }

    #[tokio::test]
    async fn test_missing_report_is_skipped() {
        let (workflow, reports) = setup(3).await;
        let second = reports.get_report_by_id(2).await.unwrap().unwrap();
        assert!(reports.delete_report(&second).await);

        let result = workflow.execute(&[1, 2], &[3]).await;

        assert_eq!(
            result,
            BatchResult {
                validated: vec![1],
                rejected: vec![3],
            }
        );
        assert_eq!(status_of(&reports, 1).await, Some(ReportStatus::Validated));
        assert_eq!(status_of(&reports, 3).await, Some(ReportStatus::Rejected));
    }

    #[tokio::test]
    async fn test_repeating_a_batch_is_a_no_op() {
        let (workflow, _reports) = setup(3).await;

        let first = workflow.execute(&[1, 2], &[3]).await;
        let second = workflow.execute(&[1, 2], &[3]).await;

        assert_eq!(first.len(), 3);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_terminal_reports_are_not_moved_again() {
        let (workflow, reports) = setup(1).await;
        workflow.execute(&[], &[1]).await;

        let result = workflow.execute(&[1], &[]).await;

        assert!(result.is_empty());
        assert_eq!(status_of(&reports, 1).await, Some(ReportStatus::Rejected));
    }

    #[tokio::test]
    async fn test_duplicate_ids_processed_once() {
        let (workflow, _reports) = setup(2).await;

        let result = workflow.execute(&[1, 1, 2, 1], &[]).await;

        assert_eq!(result.validated, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_conflicting_ids_are_left_pending() {
        let (workflow, reports) = setup(2).await;

        let result = workflow.execute(&[1, 2], &[2]).await;

        assert_eq!(result.validated, vec![1]);
        assert!(result.rejected.is_empty());
        assert_eq!(status_of(&reports, 2).await, Some(ReportStatus::Pending));
    }

    #[tokio::test]
    async fn test_concurrent_batches_move_a_report_once() {
        let (workflow, reports) = setup(1).await;
        let workflow = Arc::new(workflow);

        let validating = {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.execute(&[1], &[]).await })
        };
        let rejecting = {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.execute(&[], &[1]).await })
        };

        let validated = validating.await.unwrap();
        let rejected = rejecting.await.unwrap();

        assert_eq!(validated.len() + rejected.len(), 1);
        let expected = if validated.is_empty() {
            ReportStatus::Rejected
        } else {
            ReportStatus::Validated
        };
        assert_eq!(status_of(&reports, 1).await, Some(expected));
    }

    #[tokio::test]
    async fn test_detached_writes_terminal_report_stays_put() {
        let (workflow, reports) = setup_with(1, CacheWrites::Detached).await;

        let first = workflow.execute(&[1], &[]).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = workflow.execute(&[], &[1]).await;

        assert_eq!(first.validated, vec![1]);
        assert!(second.is_empty());
        let stored = reports.get_report_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.status, ReportStatus::Validated);
    }

    #[tokio::test]
    async fn test_detached_writes_repeating_a_batch_is_a_no_op() {
        let (workflow, reports) = setup_with(3, CacheWrites::Detached).await;
        // Warm the cache with the pending states
        reports.get_reports().await.unwrap();
        for id in 1..=3 {
            status_of(&reports, id).await;
        }

        let first = workflow.execute(&[1, 2], &[3]).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = workflow.execute(&[1, 2], &[3]).await;

        assert_eq!(first.len(), 3);
        assert!(second.is_empty());
        assert_eq!(status_of(&reports, 2).await, Some(ReportStatus::Validated));
        assert_eq!(status_of(&reports, 3).await, Some(ReportStatus::Rejected));
        let listed = reports.get_reports().await.unwrap();
        assert!(listed.iter().all(|r| r.status != ReportStatus::Pending));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (workflow, _reports) = setup(0).await;
        assert!(workflow.execute(&[], &[]).await.is_empty());
    }
}
