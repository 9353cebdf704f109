//! Read access to persisted roasting reports

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use shared::RoastBatchRecord;

use crate::error::{AppError, AppResult};
use crate::store::{with_timeout, RecordStore};

pub const DEFAULT_LIST_LIMIT: u32 = 50;
pub const MAX_LIST_LIMIT: u32 = 500;

/// Report service backing the "current data" table and CSV export
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Get a roasting report by batch id
    ///
    /// This is also how a caller resolves an unacknowledged write: if the
    /// batch exists, the submission went through.
    pub async fn get_report(&self, batch_id: i64) -> AppResult<RoastBatchRecord> {
        with_timeout(self.timeout, "find_by_batch_id", self.store.find_by_batch_id(batch_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Roasting report {}", batch_id)))
    }

    /// Most recent reports, newest first
    pub async fn list_recent(&self, limit: Option<u32>) -> AppResult<Vec<RoastBatchRecord>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let records =
            with_timeout(self.timeout, "list_recent", self.store.list_recent(limit)).await?;
        Ok(records)
    }

    /// Highest persisted batch id; doubles as the store connectivity probe
    pub async fn latest_batch_id(&self) -> AppResult<Option<i64>> {
        with_timeout(self.timeout, "ping", self.store.ping()).await?;
        let latest =
            with_timeout(self.timeout, "max_batch_id", self.store.max_batch_id()).await?;
        Ok(latest)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
