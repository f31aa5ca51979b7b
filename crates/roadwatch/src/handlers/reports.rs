//! Report CRUD and moderation handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use roadwatch_core::report::{
    filter_reports_by_status, BatchResult, BulkStatusRequest, CreateReportRequest,
    ListReportsQuery, Report, ReportError, UpdateReportRequest,
};
use roadwatch_core::storage::EntityId;

use crate::{handlers::AppError, state::AppState};

/// List reports (GET /api/reports), optionally filtered by `?status=`.
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<Vec<Report>>, AppError> {
    let reports = state.reports.get_reports().await?;

    let reports = match query.status {
        Some(status) => filter_reports_by_status(&reports, status)
            .into_iter()
            .cloned()
            .collect(),
        None => reports,
    };

    Ok(Json(reports))
}

/// File a new report (POST /api/reports).
pub async fn create_report(
    State(state): State<AppState>,
    Json(payload): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<Report>), AppError> {
    tracing::debug!(payload = ?payload, "Received create report request");

    let draft = payload.into_new_report(Utc::now())?;
    let report = state.reports.create_report(draft).await?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// Get a single report by ID (GET /api/reports/{id}).
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<Json<Report>, AppError> {
    let report = find_report(&state, id).await?;
    Ok(Json(report))
}

/// Edit a report (PUT /api/reports/{id}).
///
/// Status is not editable here; use the bulk status endpoint.
pub async fn update_report(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(payload): Json<UpdateReportRequest>,
) -> Result<Json<Report>, AppError> {
    tracing::debug!(report_id = id, payload = ?payload, "Received update report request");

    let patch = payload.into_patch()?;
    let report = find_report(&state, id).await?;

    if !state.reports.update_report(&report, patch).await? {
        return Err(ReportError::UpdateFailed(id).into());
    }

    let updated = find_report(&state, id).await?;
    Ok(Json(updated))
}

/// Delete a report (DELETE /api/reports/{id}).
pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode, AppError> {
    let report = find_report(&state, id).await?;

    if !state.reports.delete_report(&report).await {
        return Err(anyhow::anyhow!("Report {id} could not be deleted").into());
    }

    tracing::info!(report_id = id, "Deleted report");

    Ok(StatusCode::NO_CONTENT)
}

/// Validate and reject many reports at once (POST /api/reports/bulk-status).
///
/// Always answers 200; ids that could not transition are absent from the
/// response.
pub async fn bulk_status(
    State(state): State<AppState>,
    Json(payload): Json<BulkStatusRequest>,
) -> Json<BatchResult> {
    let result = state
        .bulk_status
        .execute(&payload.validate, &payload.reject)
        .await;

    Json(result)
}

async fn find_report(state: &AppState, id: EntityId) -> Result<Report, AppError> {
    state
        .reports
        .get_report_by_id(id)
        .await?
        .ok_or_else(|| ReportError::NotFound(id).into())
}
