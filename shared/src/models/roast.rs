//! Roasting batch models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Origin, RoastLevel, Roastery};
use crate::metrics::compute_weight_loss;
use crate::validation::validate_moisture_percent;

/// A roasting batch as entered on the report form
///
/// Lives only for the duration of one form submission. The `Validate` derive
/// covers the widget bounds of the form (moisture range, notes length); the
/// business rules live in [`crate::validation::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RoastBatchSubmission {
    pub roastery: Roastery,
    pub roast_date: NaiveDate,
    pub bean_code: String,
    pub origin: Origin,
    #[validate(custom = "validate_moisture_percent")]
    pub moisture_content_percent: Decimal,
    pub roast_level: RoastLevel,
    pub roast_duration_mins: i32,
    pub first_crack_time_mins: i32,
    pub development_time_mins: i32,
    pub green_bean_weight_kg: Decimal,
    pub roasted_weight_kg: Decimal,
    #[serde(default)]
    #[validate(length(max = 200, message = "Roast Notes must be 200 characters or fewer."))]
    pub roast_notes: String,
}

/// A persisted roasting batch. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoastBatchRecord {
    pub batch_id: i64,
    pub roastery: Roastery,
    pub roast_date: NaiveDate,
    pub bean_code: String,
    pub origin: Origin,
    pub moisture_content_percent: Decimal,
    pub roast_level: RoastLevel,
    pub roast_duration_mins: i32,
    pub first_crack_time_mins: i32,
    pub development_time_mins: i32,
    pub green_bean_weight_kg: Decimal,
    pub roasted_weight_kg: Decimal,
    pub weight_loss_percent: Decimal,
    pub roast_notes: String,
    /// Absent only on rows written by older tooling
    pub submission_timestamp: Option<DateTime<Utc>>,
}

impl RoastBatchRecord {
    /// Assemble a record from a validated submission and its allocated batch id
    pub fn from_submission(
        submission: &RoastBatchSubmission,
        batch_id: i64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let weight_loss_percent = compute_weight_loss(
            submission.green_bean_weight_kg,
            submission.roasted_weight_kg,
        );

        Self {
            batch_id,
            roastery: submission.roastery,
            roast_date: submission.roast_date,
            bean_code: submission.bean_code.trim().to_string(),
            origin: submission.origin,
            moisture_content_percent: submission.moisture_content_percent,
            roast_level: submission.roast_level,
            roast_duration_mins: submission.roast_duration_mins,
            first_crack_time_mins: submission.first_crack_time_mins,
            development_time_mins: submission.development_time_mins,
            green_bean_weight_kg: submission.green_bean_weight_kg,
            roasted_weight_kg: submission.roasted_weight_kg,
            weight_loss_percent,
            roast_notes: submission.roast_notes.clone(),
            submission_timestamp: Some(submitted_at),
        }
    }

    /// Roasted weight exceeds green weight. Usually an operator entry error.
    pub fn has_weight_gain(&self) -> bool {
        self.weight_loss_percent < Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn submission() -> RoastBatchSubmission {
        RoastBatchSubmission {
            roastery: Roastery::Bondi,
            roast_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            bean_code: "  KEN-07 ".to_string(),
            origin: Origin::Kenya,
            moisture_content_percent: Decimal::from_str("10.5").unwrap(),
            roast_level: RoastLevel::Medium,
            roast_duration_mins: 14,
            first_crack_time_mins: 9,
            development_time_mins: 3,
            green_bean_weight_kg: Decimal::from(12),
            roasted_weight_kg: Decimal::from_str("10.2").unwrap(),
            roast_notes: "Bright, citrus finish".to_string(),
        }
    }

    #[test]
    fn test_record_from_submission() {
        let submitted_at = Utc::now();
        let record = RoastBatchRecord::from_submission(&submission(), 7, submitted_at);

        assert_eq!(record.batch_id, 7);
        assert_eq!(record.bean_code, "KEN-07");
        assert_eq!(record.weight_loss_percent, Decimal::from(15));
        assert_eq!(record.submission_timestamp, Some(submitted_at));
        assert!(!record.has_weight_gain());
    }

    #[test]
    fn test_weight_gain_is_flagged_not_rejected() {
        let mut input = submission();
        input.roasted_weight_kg = Decimal::from(13);

        let record = RoastBatchRecord::from_submission(&input, 1, Utc::now());
        assert!(record.has_weight_gain());
        assert_eq!(record.weight_loss_percent, Decimal::from_str("-8.33").unwrap());
    }

    #[test]
    fn test_submission_json_uses_form_labels() {
        let json = serde_json::json!({
            "roastery": "Coogee Store",
            "roast_date": "2025-03-14",
            "bean_code": "ETH-01",
            "origin": "Ethiopia",
            "moisture_content_percent": "11.2",
            "roast_level": "Medium-Dark",
            "roast_duration_mins": 40,
            "first_crack_time_mins": 30,
            "development_time_mins": 30,
            "green_bean_weight_kg": "20.0",
            "roasted_weight_kg": "17.0"
        });

        let parsed: RoastBatchSubmission = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.roastery, Roastery::Coogee);
        assert_eq!(parsed.roast_level, RoastLevel::MediumDark);
        assert!(parsed.roast_notes.is_empty());
    }
}
