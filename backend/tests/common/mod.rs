//! Fixtures shared by the backend integration tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use cloud_roasters::store::{MemoryRecordStore, RecordStore, StoreError, StoreResult};
use rust_decimal::Decimal;
use shared::{Origin, RoastBatchRecord, RoastBatchSubmission, RoastLevel, Roastery};

// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// A submission that passes every rule
pub fn sample_submission() -> RoastBatchSubmission {
    RoastBatchSubmission {
        roastery: Roastery::MartinPlace,
        roast_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        bean_code: "ETH-01".to_string(),
        origin: Origin::Ethiopia,
        moisture_content_percent: dec("10.5"),
        roast_level: RoastLevel::Medium,
        roast_duration_mins: 40,
        first_crack_time_mins: 30,
        development_time_mins: 30,
        green_bean_weight_kg: dec("20.0"),
        roasted_weight_kg: dec("17.0"),
        roast_notes: "Bright, floral finish".to_string(),
    }
}

/// A persisted record with the given batch id
pub fn sample_record(batch_id: i64) -> RoastBatchRecord {
    RoastBatchRecord::from_submission(&sample_submission(), batch_id, Utc::now())
}

/// How reads of the highest batch id misbehave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFault {
    None,
    Unavailable,
    Hang,
}

/// How inserts misbehave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertFault {
    None,
    Unavailable,
    /// The store refuses the row itself, e.g. a value too long for a column
    Rejected,
    /// Connection dropped after the statement was sent; nothing landed
    Ambiguous,
    /// Row lands, but the acknowledgement never arrives
    HangAfterWrite,
    /// Nothing lands and the acknowledgement never arrives
    Hang,
    /// Another writer takes the id first, every time
    AlwaysDuplicate,
    /// Another writer takes the id first, once
    LoseFirstRace,
}

/// Memory store with injectable faults
pub struct FaultyStore {
    pub inner: MemoryRecordStore,
    read_fault: Mutex<ReadFault>,
    insert_fault: Mutex<InsertFault>,
    raced: AtomicBool,
    insert_calls: AtomicU32,
}

impl FaultyStore {
    pub fn new(read_fault: ReadFault, insert_fault: InsertFault) -> Self {
        Self {
            inner: MemoryRecordStore::new(),
            read_fault: Mutex::new(read_fault),
            insert_fault: Mutex::new(insert_fault),
            raced: AtomicBool::new(false),
            insert_calls: AtomicU32::new(0),
        }
    }

    pub fn failing_inserts(fault: InsertFault) -> Self {
        Self::new(ReadFault::None, fault)
    }

    pub fn failing_reads(fault: ReadFault) -> Self {
        Self::new(fault, InsertFault::None)
    }

    pub fn set_insert_fault(&self, fault: InsertFault) {
        *self.insert_fault.lock().unwrap() = fault;
    }

    pub fn insert_calls(&self) -> u32 {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn max_batch_id(&self) -> StoreResult<Option<i64>> {
        let fault = *self.read_fault.lock().unwrap();
        match fault {
            ReadFault::None => self.inner.max_batch_id().await,
            ReadFault::Unavailable => Err(StoreError::Unavailable("connection refused".into())),
            ReadFault::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                self.inner.max_batch_id().await
            }
        }
    }

    async fn insert(&self, record: &RoastBatchRecord) -> StoreResult<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let fault = *self.insert_fault.lock().unwrap();
        match fault {
            InsertFault::None => self.inner.insert(record).await,
            InsertFault::Unavailable => Err(StoreError::Unavailable("connection refused".into())),
            InsertFault::Rejected => Err(StoreError::Rejected("value too long".into())),
            InsertFault::Ambiguous => Err(StoreError::AmbiguousWrite("connection reset".into())),
            InsertFault::HangAfterWrite => {
                self.inner.insert(record).await?;
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
            InsertFault::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
            InsertFault::AlwaysDuplicate => Err(StoreError::DuplicateBatchId(record.batch_id)),
            InsertFault::LoseFirstRace => {
                if !self.raced.swap(true, Ordering::SeqCst) {
                    let mut competitor = sample_record(record.batch_id);
                    competitor.bean_code = "RACER".to_string();
                    self.inner.insert(&competitor).await?;
                }
                self.inner.insert(record).await
            }
        }
    }

    async fn find_by_batch_id(&self, batch_id: i64) -> StoreResult<Option<RoastBatchRecord>> {
        self.inner.find_by_batch_id(batch_id).await
    }

    async fn list_recent(&self, limit: u32) -> StoreResult<Vec<RoastBatchRecord>> {
        self.inner.list_recent(limit).await
    }

    async fn ping(&self) -> StoreResult<()> {
        match *self.read_fault.lock().unwrap() {
            ReadFault::None => Ok(()),
            _ => Err(StoreError::Unavailable("connection refused".into())),
        }
    }
}
