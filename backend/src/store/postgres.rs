//! PostgreSQL record store backed by the `roasting_reports` table

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{ParseLabelError, RoastBatchRecord};
use sqlx::error::ErrorKind;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use super::{RecordStore, StoreError, StoreResult};
use crate::config::DatabaseConfig;

const REPORT_COLUMNS: &str = "batch_id, roastery, roast_date, bean_code, origin, moisture_content, \
     roast_level, roast_duration_mins, first_crack_time_mins, development_time_mins, \
     green_bean_weight_kg, roasted_weight_kg, weight_loss, roast_notes, submission_timestamp";

/// Record store over a PostgreSQL connection pool
///
/// Every operation checks a connection out of the pool for the duration of a
/// single statement; the pool takes it back when the future completes or is
/// dropped.
#[derive(Clone)]
pub struct PgRecordStore {
    db: PgPool,
}

/// Row shape of `roasting_reports`
#[derive(Debug, FromRow)]
struct RoastingReportRow {
    batch_id: i64,
    roastery: String,
    roast_date: NaiveDate,
    bean_code: String,
    origin: String,
    moisture_content: Decimal,
    roast_level: String,
    roast_duration_mins: i32,
    first_crack_time_mins: i32,
    development_time_mins: i32,
    green_bean_weight_kg: Decimal,
    roasted_weight_kg: Decimal,
    weight_loss: Decimal,
    roast_notes: Option<String>,
    submission_timestamp: Option<DateTime<Utc>>,
}

impl TryFrom<RoastingReportRow> for RoastBatchRecord {
    type Error = ParseLabelError;

    fn try_from(row: RoastingReportRow) -> Result<Self, Self::Error> {
        Ok(RoastBatchRecord {
            batch_id: row.batch_id,
            roastery: row.roastery.parse()?,
            roast_date: row.roast_date,
            bean_code: row.bean_code,
            origin: row.origin.parse()?,
            moisture_content_percent: row.moisture_content,
            roast_level: row.roast_level.parse()?,
            roast_duration_mins: row.roast_duration_mins,
            first_crack_time_mins: row.first_crack_time_mins,
            development_time_mins: row.development_time_mins,
            green_bean_weight_kg: row.green_bean_weight_kg,
            roasted_weight_kg: row.roasted_weight_kg,
            weight_loss_percent: row.weight_loss,
            roast_notes: row.roast_notes.unwrap_or_default(),
            submission_timestamp: row.submission_timestamp,
        })
    }
}

impl PgRecordStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open a connection pool using the database settings
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;
        Ok(Self::new(db))
    }

    /// Create the `roasting_reports` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db).await
    }

    fn decode(row: RoastingReportRow) -> StoreResult<RoastBatchRecord> {
        let batch_id = row.batch_id;
        RoastBatchRecord::try_from(row)
            .map_err(|e| StoreError::InvalidRow(format!("batch {}: {}", batch_id, e)))
    }
}

/// Classify a failed read. Reads never leave anything behind.
fn read_error(error: sqlx::Error) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

/// Classify a failed insert of `batch_id`
fn write_error(error: sqlx::Error, batch_id: i64) -> StoreError {
    match error {
        sqlx::Error::Database(ref db_err) => refused_write(
            db_err.kind(),
            db_err.code().as_deref(),
            db_err.message(),
            batch_id,
        ),
        // The statement may have reached the server before the connection broke.
        sqlx::Error::Io(_) | sqlx::Error::Protocol(_) | sqlx::Error::WorkerCrashed => {
            StoreError::AmbiguousWrite(error.to_string())
        }
        other => StoreError::Unavailable(other.to_string()),
    }
}

/// Classify an insert the server answered with an error
///
/// Only a primary key clash is worth another allocation. Integrity (class 23)
/// and data (class 22) errors are properties of the row; anything else, such
/// as too many connections, is treated as the store being unavailable.
fn refused_write(kind: ErrorKind, code: Option<&str>, message: &str, batch_id: i64) -> StoreError {
    match kind {
        ErrorKind::UniqueViolation => StoreError::DuplicateBatchId(batch_id),
        ErrorKind::ForeignKeyViolation | ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
            StoreError::Rejected(message.to_string())
        }
        _ if code.is_some_and(|c| c.starts_with("22") || c.starts_with("23")) => {
            StoreError::Rejected(message.to_string())
        }
        _ => StoreError::Unavailable(message.to_string()),
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn max_batch_id(&self) -> StoreResult<Option<i64>> {
        sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(batch_id) FROM roasting_reports")
            .fetch_one(&self.db)
            .await
            .map_err(read_error)
    }

    async fn insert(&self, record: &RoastBatchRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roasting_reports (
                batch_id, roastery, roast_date, bean_code, origin, moisture_content,
                roast_level, roast_duration_mins, first_crack_time_mins, development_time_mins,
                green_bean_weight_kg, roasted_weight_kg, weight_loss, roast_notes,
                submission_timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(record.batch_id)
        .bind(record.roastery.as_str())
        .bind(record.roast_date)
        .bind(&record.bean_code)
        .bind(record.origin.as_str())
        .bind(record.moisture_content_percent)
        .bind(record.roast_level.as_str())
        .bind(record.roast_duration_mins)
        .bind(record.first_crack_time_mins)
        .bind(record.development_time_mins)
        .bind(record.green_bean_weight_kg)
        .bind(record.roasted_weight_kg)
        .bind(record.weight_loss_percent)
        .bind(&record.roast_notes)
        .bind(record.submission_timestamp)
        .execute(&self.db)
        .await
        .map_err(|e| write_error(e, record.batch_id))?;

        Ok(())
    }

    async fn find_by_batch_id(&self, batch_id: i64) -> StoreResult<Option<RoastBatchRecord>> {
        let row = sqlx::query_as::<_, RoastingReportRow>(&format!(
            "SELECT {} FROM roasting_reports WHERE batch_id = $1",
            REPORT_COLUMNS
        ))
        .bind(batch_id)
        .fetch_optional(&self.db)
        .await
        .map_err(read_error)?;

        row.map(Self::decode).transpose()
    }

    async fn list_recent(&self, limit: u32) -> StoreResult<Vec<RoastBatchRecord>> {
        let rows = sqlx::query_as::<_, RoastingReportRow>(&format!(
            "SELECT {} FROM roasting_reports ORDER BY batch_id DESC LIMIT $1",
            REPORT_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.db)
        .await
        .map_err(read_error)?;

        rows.into_iter().map(Self::decode).collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .map_err(read_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Origin, RoastLevel, Roastery};

    fn row() -> RoastingReportRow {
        RoastingReportRow {
            batch_id: 3,
            roastery: "Paddington Store".to_string(),
            roast_date: NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
            bean_code: "BRA-02".to_string(),
            origin: "Brazil".to_string(),
            moisture_content: Decimal::from(11),
            roast_level: "Dark".to_string(),
            roast_duration_mins: 16,
            first_crack_time_mins: 10,
            development_time_mins: 4,
            green_bean_weight_kg: Decimal::from(10),
            roasted_weight_kg: Decimal::from(8),
            weight_loss: Decimal::from(20),
            roast_notes: None,
            submission_timestamp: None,
        }
    }

    #[test]
    fn test_row_decodes_labels() {
        let record = RoastBatchRecord::try_from(row()).unwrap();
        assert_eq!(record.roastery, Roastery::Paddington);
        assert_eq!(record.origin, Origin::Brazil);
        assert_eq!(record.roast_level, RoastLevel::Dark);
        assert_eq!(record.roast_notes, "");
    }

    #[test]
    fn test_row_with_unknown_label_is_invalid() {
        let mut bad = row();
        bad.roast_level = "Cinnamon".to_string();

        let err = PgRecordStore::decode(bad).unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidRow("batch 3: Unknown roast level: Cinnamon".to_string())
        );
    }

    #[test]
    fn test_io_failure_on_insert_is_ambiguous() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        assert!(matches!(
            write_error(sqlx::Error::Io(io), 9),
            StoreError::AmbiguousWrite(_)
        ));
    }

    #[test]
    fn test_primary_key_clash_is_duplicate() {
        assert_eq!(
            refused_write(ErrorKind::UniqueViolation, Some("23505"), "duplicate key", 9),
            StoreError::DuplicateBatchId(9)
        );
    }

    #[test]
    fn test_value_too_long_is_rejected_not_unavailable() {
        let err = refused_write(
            ErrorKind::Other,
            Some("22001"),
            "value too long for type character varying(100)",
            9,
        );
        assert_eq!(
            err,
            StoreError::Rejected("value too long for type character varying(100)".to_string())
        );
    }

    #[test]
    fn test_too_many_connections_is_unavailable() {
        assert!(matches!(
            refused_write(ErrorKind::Other, Some("53300"), "too many connections", 9),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn test_pool_timeout_on_insert_is_unavailable() {
        assert!(matches!(
            write_error(sqlx::Error::PoolTimedOut, 9),
            StoreError::Unavailable(_)
        ));
    }
}
