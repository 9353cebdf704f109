//! Record store for persisted roasting batch reports
//!
//! The submission pipeline only sees the [`RecordStore`] trait. Batch id
//! uniqueness is enforced by the store itself (primary key / map key); callers
//! learn about a lost race through [`StoreError::DuplicateBatchId`].

mod memory;
mod postgres;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use shared::RoastBatchRecord;
use thiserror::Error;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// Record store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached, or refused the statement outright.
    /// Nothing was written.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Record store did not answer {operation} within {timeout:?}")]
    TimedOut {
        operation: &'static str,
        timeout: Duration,
    },

    /// Another writer already persisted this batch id
    #[error("Batch id {0} already exists")]
    DuplicateBatchId(i64),

    /// The write was sent but its outcome is unknown
    #[error("Write outcome unknown: {0}")]
    AmbiguousWrite(String),

    /// The store answered and refused the row itself (constraint or data
    /// error). Resubmitting the same record fails the same way.
    #[error("Record store refused the record: {0}")]
    Rejected(String),

    #[error("No batch id left above {0}")]
    BatchIdsExhausted(i64),

    #[error("Stored row is not a valid roasting report: {0}")]
    InvalidRow(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence capability consumed by the batch services
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Highest persisted batch id, `None` when the store is empty
    async fn max_batch_id(&self) -> StoreResult<Option<i64>>;

    /// Append one record. Must fail with [`StoreError::DuplicateBatchId`]
    /// rather than overwrite an existing batch id.
    async fn insert(&self, record: &RoastBatchRecord) -> StoreResult<()>;

    async fn find_by_batch_id(&self, batch_id: i64) -> StoreResult<Option<RoastBatchRecord>>;

    /// Most recent records, highest batch id first
    async fn list_recent(&self, limit: u32) -> StoreResult<Vec<RoastBatchRecord>>;

    /// Cheap connectivity probe
    async fn ping(&self) -> StoreResult<()>;
}

/// Bound a store operation by the caller's timeout
pub async fn with_timeout<T, F>(timeout: Duration, operation: &'static str, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::TimedOut { operation, timeout }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let result = with_timeout(Duration::from_millis(50), "ping", async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result: StoreResult<()> = with_timeout(Duration::from_millis(10), "insert", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert_eq!(
            result,
            Err(StoreError::TimedOut {
                operation: "insert",
                timeout: Duration::from_millis(10),
            })
        );
    }
}
