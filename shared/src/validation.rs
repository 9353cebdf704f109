//! Validation rules for roasting batch submissions
//!
//! Two layers run on every submission:
//! - [`validate`]: the batch report business rules, all collected together
//! - [`form_bound_errors`]: the input bounds the report form enforces on its
//!   widgets (moisture range, notes length), checked with `validator`

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::models::RoastBatchSubmission;

pub const BEAN_CODE_REQUIRED: &str = "Bean Name / Code is required.";
pub const ROAST_DURATION_REQUIRED: &str = "Roast Duration must be greater than 0.";
pub const FIRST_CRACK_REQUIRED: &str = "First Crack Time must be greater than 0.";
pub const DEVELOPMENT_TIME_REQUIRED: &str = "Development Time must be greater than 0.";
pub const GREEN_WEIGHT_REQUIRED: &str = "Green Bean Weight must be greater than 0.";
pub const ROASTED_WEIGHT_REQUIRED: &str = "Final Roasted Weight must be greater than 0.";
pub const MOISTURE_OUT_OF_RANGE: &str = "Moisture Content must be between 0 and 100.";

/// Longest roast note the form accepts
pub const MAX_NOTES_CHARS: usize = 200;

/// Outcome of validating a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "errors", rename_all = "snake_case")]
pub enum ValidationResult {
    Ok,
    Errors(Vec<String>),
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok)
    }

    pub fn errors(&self) -> &[String] {
        match self {
            ValidationResult::Ok => &[],
            ValidationResult::Errors(errors) => errors,
        }
    }

    pub fn into_errors(self) -> Vec<String> {
        match self {
            ValidationResult::Ok => Vec::new(),
            ValidationResult::Errors(errors) => errors,
        }
    }
}

// ============================================================================
// Business Rules
// ============================================================================

/// Validate a roasting batch submission
///
/// Every rule is checked; violations are reported together in rule order.
pub fn validate(submission: &RoastBatchSubmission) -> ValidationResult {
    let checks = [
        (!submission.bean_code.trim().is_empty(), BEAN_CODE_REQUIRED),
        (submission.roast_duration_mins > 0, ROAST_DURATION_REQUIRED),
        (submission.first_crack_time_mins > 0, FIRST_CRACK_REQUIRED),
        (submission.development_time_mins > 0, DEVELOPMENT_TIME_REQUIRED),
        (submission.green_bean_weight_kg > Decimal::ZERO, GREEN_WEIGHT_REQUIRED),
        (submission.roasted_weight_kg > Decimal::ZERO, ROASTED_WEIGHT_REQUIRED),
    ];

    let errors: Vec<String> = checks
        .iter()
        .filter(|(passed, _)| !passed)
        .map(|(_, message)| message.to_string())
        .collect();

    if errors.is_empty() {
        ValidationResult::Ok
    } else {
        ValidationResult::Errors(errors)
    }
}

// ============================================================================
// Form Bounds
// ============================================================================

/// Fields carrying form bounds, in form order
const BOUNDED_FIELDS: &[&str] = &["moisture_content_percent", "roast_notes"];

/// Validate moisture content is a percentage
pub fn validate_moisture_percent(moisture: &Decimal) -> Result<(), ValidationError> {
    if *moisture < Decimal::ZERO || *moisture > Decimal::ONE_HUNDRED {
        let mut error = ValidationError::new("moisture_range");
        error.message = Some(Cow::Borrowed(MOISTURE_OUT_OF_RANGE));
        return Err(error);
    }
    Ok(())
}

/// Messages for every violated form bound, in form order
pub fn form_bound_errors(submission: &RoastBatchSubmission) -> Vec<String> {
    let Err(errors) = submission.validate() else {
        return Vec::new();
    };

    let field_errors = errors.field_errors();
    BOUNDED_FIELDS
        .iter()
        .filter_map(|field| field_errors.get(field))
        .flat_map(|errors| errors.iter())
        .map(|error| match &error.message {
            Some(message) => message.to_string(),
            None => format!("{} is invalid.", error.code),
        })
        .collect()
}

/// Every reason a submission cannot be accepted: business rules first, then form bounds
pub fn submission_errors(submission: &RoastBatchSubmission) -> Vec<String> {
    let mut errors = validate(submission).into_errors();
    errors.extend(form_bound_errors(submission));
    errors
}
