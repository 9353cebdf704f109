//! HTTP handlers for roasting report endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::{FormOptions, RoastBatchRecord, RoastBatchSubmission};

use crate::error::{AppError, AppResult};
use crate::services::reports::ReportService;
use crate::services::submission::SubmissionResult;
use crate::AppState;

/// Submit a roasting report
///
/// The pipeline runs on its own task so a client that disconnects mid-request
/// cannot cut it off between allocation and insert.
pub async fn submit_report(
    State(state): State<AppState>,
    payload: Result<Json<RoastBatchSubmission>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RoastBatchRecord>)> {
    let Json(submission) = payload.map_err(|e| AppError::InvalidPayload(e.body_text()))?;

    let service = state.submissions.clone();
    let result = tokio::spawn(async move { service.submit(&submission).await })
        .await
        .map_err(|e| AppError::Internal(format!("Submission task failed: {}", e)))?;

    match result {
        SubmissionResult::Accepted(record) => Ok((StatusCode::CREATED, Json(record))),
        SubmissionResult::Rejected(errors) => Err(AppError::Validation(errors)),
        SubmissionResult::PersistenceFailed(cause) => Err(cause.into()),
    }
}

/// Get a roasting report by batch id
pub async fn get_report(
    State(state): State<AppState>,
    Path(batch_id): Path<i64>,
) -> AppResult<Json<RoastBatchRecord>> {
    let record = state.reports.get_report(batch_id).await?;
    Ok(Json(record))
}

/// Query parameters for listing reports
#[derive(Debug, Deserialize)]
pub struct ListReportsQuery {
    pub limit: Option<u32>,
    pub format: Option<String>, // "json" or "csv"
}

/// List the most recent roasting reports
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<Response> {
    let records = state.reports.list_recent(query.limit).await?;

    match query.format.as_deref() {
        None | Some("json") => Ok(Json(records).into_response()),
        Some("csv") => {
            let csv = ReportService::export_to_csv(&records)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"roasting_reports.csv\"",
                    ),
                ],
                csv,
            )
                .into_response())
        }
        Some(other) => Err(AppError::BadRequest(format!(
            "Unsupported format '{}', expected json or csv",
            other
        ))),
    }
}

/// Options for the report form's select inputs
pub async fn form_options() -> Json<FormOptions> {
    Json(FormOptions::default())
}
