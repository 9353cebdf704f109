//! In-process record store
//!
//! Used for local runs without PostgreSQL and as the store behind the test
//! suite. The map key plays the role of the primary key constraint.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use async_trait::async_trait;
use shared::RoastBatchRecord;
use tokio::sync::RwLock;

use super::{RecordStore, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<BTreeMap<i64, RoastBatchRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records
    pub fn with_records(records: impl IntoIterator<Item = RoastBatchRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.batch_id, record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// All batch ids in ascending order
    pub async fn batch_ids(&self) -> Vec<i64> {
        self.records.read().await.keys().copied().collect()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn max_batch_id(&self) -> StoreResult<Option<i64>> {
        Ok(self.records.read().await.keys().next_back().copied())
    }

    async fn insert(&self, record: &RoastBatchRecord) -> StoreResult<()> {
        match self.records.write().await.entry(record.batch_id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateBatchId(record.batch_id)),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn find_by_batch_id(&self, batch_id: i64) -> StoreResult<Option<RoastBatchRecord>> {
        Ok(self.records.read().await.get(&batch_id).cloned())
    }

    async fn list_recent(&self, limit: u32) -> StoreResult<Vec<RoastBatchRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
