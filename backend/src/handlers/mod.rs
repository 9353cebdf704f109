//! HTTP handlers for the Cloud Roasters batch reporting API

mod health;
mod roasting;

pub use health::*;
pub use roasting::*;
