//! Cloud Roasters - roasting batch reporting service
//!
//! Accepts roasting batch reports from the roastery form, derives the weight
//! loss, assigns batch ids and stores each report exactly once.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::config::Config;

use services::{ReportService, SubmissionOptions, SubmissionService};
use store::RecordStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub submissions: SubmissionService,
    pub reports: ReportService,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, options: SubmissionOptions) -> Self {
        Self {
            submissions: SubmissionService::new(store.clone(), options),
            reports: ReportService::new(store, options.store_timeout),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Cloud Roasters Batch Reporting API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
