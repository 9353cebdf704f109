//! Batch id allocation

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::store::{with_timeout, RecordStore, StoreError, StoreResult};

/// Derives the next batch id from the highest id already persisted
///
/// Reading the maximum and writing the new record are two separate store
/// round trips, so two writers can compute the same id. Callers must hold the
/// submission write lock across allocate + insert, and still treat
/// [`crate::store::StoreError::DuplicateBatchId`] on insert as a lost race
/// against another process.
#[derive(Clone)]
pub struct BatchIdAllocator {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
    /// Highest id handed out by this allocator or any of its clones
    last_issued: Arc<AtomicI64>,
}

impl BatchIdAllocator {
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            last_issued: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Next batch id: one past the larger of the persisted maximum and the
    /// last id issued here, or 1 for an empty store
    ///
    /// An id whose insert failed or went unacknowledged is never handed out
    /// again by this process, so a caller checking that batch later cannot
    /// find somebody else's report under it.
    pub async fn next_batch_id(&self) -> StoreResult<i64> {
        let stored = with_timeout(self.timeout, "max_batch_id", self.store.max_batch_id())
            .await?
            .unwrap_or(0);

        let mut issued = 0;
        self.last_issued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                issued = last.max(stored).checked_add(1)?;
                Some(issued)
            })
            .map_err(|last| StoreError::BatchIdsExhausted(last.max(stored)))?;

        Ok(issued)
    }
}
