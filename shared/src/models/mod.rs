//! Domain models for roasting batch reports

mod labels;
mod roast;

pub use labels::*;
pub use roast::*;
