//! Roasting batch submission pipeline
//!
//! validate → allocate batch id → compute weight loss → insert, stopping at
//! the first failure. A submission either lands as exactly one row or leaves
//! the store untouched.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared::{submission_errors, RoastBatchRecord, RoastBatchSubmission};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::StoreConfig;
use crate::services::batch_id::BatchIdAllocator;
use crate::store::{with_timeout, RecordStore, StoreError};

/// Why a valid submission could not be persisted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Store unreachable or timed out before anything was written
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    /// The insert was issued but never acknowledged. Look up `batch_id`
    /// before resubmitting.
    #[error("Write of batch {batch_id} was not acknowledged: {cause}")]
    PartialWriteAmbiguous { batch_id: i64, cause: String },

    /// The store refused the record itself. Resubmitting the same data
    /// fails the same way.
    #[error("Record store refused the report: {0}")]
    StoreRejected(String),

    /// Every attempt lost the batch id race to another writer
    #[error("Batch id still conflicting after {attempts} attempts (last tried {last_batch_id})")]
    AllocationConflict { attempts: u32, last_batch_id: i64 },
}

/// Outcome of one submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResult {
    Accepted(RoastBatchRecord),
    Rejected(Vec<String>),
    PersistenceFailed(PersistenceError),
}

impl SubmissionResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionResult::Accepted(_))
    }
}

/// Tunables for the submission pipeline
#[derive(Debug, Clone, Copy)]
pub struct SubmissionOptions {
    /// Upper bound on each store read and write
    pub store_timeout: Duration,
    pub max_allocation_attempts: u32,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            max_allocation_attempts: 3,
        }
    }
}

impl From<&StoreConfig> for SubmissionOptions {
    fn from(config: &StoreConfig) -> Self {
        Self {
            store_timeout: config.timeout(),
            max_allocation_attempts: config.max_allocation_attempts,
        }
    }
}

/// Submission service for roasting batch reports
///
/// Clones share one write lock, so every submission going through this
/// service (and its clones) allocates and inserts one at a time.
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn RecordStore>,
    allocator: BatchIdAllocator,
    write_lock: Arc<Mutex<()>>,
    options: SubmissionOptions,
}

impl SubmissionService {
    /// Create a new SubmissionService instance
    pub fn new(store: Arc<dyn RecordStore>, options: SubmissionOptions) -> Self {
        Self {
            allocator: BatchIdAllocator::new(store.clone(), options.store_timeout),
            store,
            write_lock: Arc::new(Mutex::new(())),
            options,
        }
    }

    /// Validate and persist one roasting batch submission
    #[tracing::instrument(
        name = "submit_roast_batch",
        skip_all,
        fields(roastery = %submission.roastery, bean_code = %submission.bean_code.trim())
    )]
    pub async fn submit(&self, submission: &RoastBatchSubmission) -> SubmissionResult {
        let errors = submission_errors(submission);
        if !errors.is_empty() {
            tracing::info!(error_count = errors.len(), "Roast batch submission rejected");
            return SubmissionResult::Rejected(errors);
        }

        let _guard = self.write_lock.lock().await;

        let attempts = self.options.max_allocation_attempts.max(1);
        let mut last_batch_id = 0;

        for attempt in 1..=attempts {
            let batch_id = match self.allocator.next_batch_id().await {
                Ok(batch_id) => batch_id,
                Err(e) => {
                    tracing::error!(error = %e, "Batch id allocation failed");
                    let cause = match e {
                        StoreError::BatchIdsExhausted(_) => {
                            PersistenceError::StoreRejected(e.to_string())
                        }
                        _ => PersistenceError::StoreUnavailable(e.to_string()),
                    };
                    return SubmissionResult::PersistenceFailed(cause);
                }
            };
            last_batch_id = batch_id;

            let record = RoastBatchRecord::from_submission(submission, batch_id, Utc::now());

            let written = with_timeout(
                self.options.store_timeout,
                "insert",
                self.store.insert(&record),
            )
            .await;

            match written {
                Ok(()) => {
                    if record.has_weight_gain() {
                        tracing::warn!(
                            batch_id,
                            weight_loss_percent = %record.weight_loss_percent,
                            "Roasted weight exceeds green weight"
                        );
                    }
                    tracing::info!(batch_id, attempt, "Roast batch recorded");
                    return SubmissionResult::Accepted(record);
                }
                Err(StoreError::DuplicateBatchId(_)) => {
                    tracing::warn!(batch_id, attempt, "Batch id taken by another writer, reallocating");
                }
                Err(e @ (StoreError::TimedOut { .. } | StoreError::AmbiguousWrite(_))) => {
                    tracing::error!(batch_id, error = %e, "Roast batch write not acknowledged");
                    return SubmissionResult::PersistenceFailed(
                        PersistenceError::PartialWriteAmbiguous {
                            batch_id,
                            cause: e.to_string(),
                        },
                    );
                }
                Err(e @ StoreError::Rejected(_)) => {
                    tracing::error!(batch_id, error = %e, "Roast batch refused by the store");
                    return SubmissionResult::PersistenceFailed(PersistenceError::StoreRejected(
                        e.to_string(),
                    ));
                }
                Err(e) => {
                    tracing::error!(batch_id, error = %e, "Roast batch write failed");
                    return SubmissionResult::PersistenceFailed(PersistenceError::StoreUnavailable(
                        e.to_string(),
                    ));
                }
            }
        }

        tracing::error!(attempts, last_batch_id, "Giving up on batch id allocation");
        SubmissionResult::PersistenceFailed(PersistenceError::AllocationConflict {
            attempts,
            last_batch_id,
        })
    }
}
