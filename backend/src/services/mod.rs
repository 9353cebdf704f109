//! Business logic services for roasting batch reports

pub mod batch_id;
pub mod reports;
pub mod submission;

pub use batch_id::BatchIdAllocator;
pub use reports::ReportService;
pub use submission::{PersistenceError, SubmissionOptions, SubmissionResult, SubmissionService};
