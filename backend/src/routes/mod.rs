//! Route definitions for the Cloud Roasters batch reporting API

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/roasting-reports", roasting_report_routes())
}

/// Roasting report routes
fn roasting_report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_reports).post(handlers::submit_report),
        )
        .route("/form-options", get(handlers::form_options))
        .route("/:batch_id", get(handlers::get_report))
}
