//! Shared types and models for the Cloud Roasters batch reporting service
//!
//! This crate contains the roasting batch domain types, the derived-metrics
//! calculator and the submission validator. It performs no I/O so the same
//! rules run in the backend and in the browser form (via WASM).

pub mod metrics;
pub mod models;
pub mod validation;

pub use metrics::*;
pub use models::*;
pub use validation::*;
