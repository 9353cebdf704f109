//! Error handling for the Cloud Roasters batch reporting service
//!
//! Provides consistent JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::submission::PersistenceError;
use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("Invalid request payload: {0}")]
    InvalidPayload(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Persistence errors
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Write of batch {batch_id} was not acknowledged: {message}")]
    PartialWriteAmbiguous { batch_id: i64, message: String },

    #[error("Record store refused the report: {0}")]
    StoreRejected(String),

    #[error("Batch id allocation conflict: {0}")]
    AllocationConflict(String),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    /// Set when the caller should look this batch up before retrying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<i64>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
            batch_id: None,
        }
    }
}

impl From<PersistenceError> for AppError {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            PersistenceError::StoreRejected(msg) => AppError::StoreRejected(msg),
            PersistenceError::PartialWriteAmbiguous { batch_id, cause } => {
                AppError::PartialWriteAmbiguous {
                    batch_id,
                    message: cause,
                }
            }
            e @ PersistenceError::AllocationConflict { .. } => {
                AppError::AllocationConflict(e.to_string())
            }
        }
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    details: Some(errors.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", "The roasting report has errors")
                },
            ),
            AppError::InvalidPayload(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("INVALID_PAYLOAD", msg.clone()),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("BAD_REQUEST", msg.clone()),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::StoreUnavailable(_) | AppError::Store(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new(
                    "STORE_UNAVAILABLE",
                    "The roasting report store is unavailable. Please try again.",
                ),
            ),
            AppError::PartialWriteAmbiguous { batch_id, .. } => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorDetail {
                    batch_id: Some(*batch_id),
                    ..ErrorDetail::new(
                        "PARTIAL_WRITE_AMBIGUOUS",
                        format!(
                            "The report may have been saved as batch {}. Check that batch before resubmitting.",
                            batch_id
                        ),
                    )
                },
            ),
            AppError::StoreRejected(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "STORE_REJECTED",
                    "The roasting report store refused this report. Resubmitting it will not help.",
                ),
            ),
            AppError::AllocationConflict(_) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "ALLOCATION_CONFLICT",
                    "Too many reports were submitted at once. Please resubmit.",
                ),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request error: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
