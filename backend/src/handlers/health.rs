//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// "healthy" when the record store answers, "degraded" otherwise
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
    /// Highest persisted batch id, absent when the store is empty or unreachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_batch_id: Option<i64>,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, store, latest_batch_id) = match state.reports.latest_batch_id().await {
        Ok(latest) => ("healthy", "connected", latest),
        Err(e) => {
            tracing::warn!("Record store health probe failed: {}", e);
            ("degraded", "disconnected", None)
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store,
        latest_batch_id,
    })
}
