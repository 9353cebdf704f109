//! WebAssembly module for the Cloud Roasters report form
//!
//! Provides client-side computation for:
//! - Weight loss preview while the operator types
//! - Submission validation before the form is posted
//! - Pick-list options for the form selects

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

pub use shared::metrics::*;
pub use shared::models::*;
pub use shared::validation::*;

/// Preview the weight loss percentage for the entered weights
#[wasm_bindgen]
pub fn preview_weight_loss(green_weight_kg: f64, roasted_weight_kg: f64) -> f64 {
    let (Ok(green), Ok(roasted)) = (
        Decimal::try_from(green_weight_kg),
        Decimal::try_from(roasted_weight_kg),
    ) else {
        return 0.0;
    };

    compute_weight_loss(green, roasted)
        .to_string()
        .parse()
        .unwrap_or(0.0)
}

/// Validate a submission JSON, returning a JSON array of error messages
///
/// An empty array means the submission will pass server-side validation.
#[wasm_bindgen]
pub fn validate_submission(submission_json: &str) -> Result<String, JsValue> {
    let messages = submission_messages(submission_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid submission JSON: {}", e)))?;
    serde_json::to_string(&messages).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Form select options as JSON
#[wasm_bindgen]
pub fn form_options() -> String {
    serde_json::to_string(&FormOptions::default()).unwrap_or_else(|_| "{}".to_string())
}

fn submission_messages(submission_json: &str) -> Result<Vec<String>, serde_json::Error> {
    let submission: RoastBatchSubmission = serde_json::from_str(submission_json)?;
    Ok(submission_errors(&submission))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission_json(roast_duration: i32) -> String {
        serde_json::json!({
            "roastery": "Bronte Store",
            "roast_date": "2025-02-01",
            "bean_code": "ETH-01",
            "origin": "Ethiopia",
            "moisture_content_percent": 10.8,
            "roast_level": "Light",
            "roast_duration_mins": roast_duration,
            "first_crack_time_mins": 30,
            "development_time_mins": 30,
            "green_bean_weight_kg": 20.0,
            "roasted_weight_kg": 17.0,
            "roast_notes": ""
        })
        .to_string()
    }

    #[test]
    fn test_preview_weight_loss() {
        assert!((preview_weight_loss(20.0, 15.0) - 25.0).abs() < 0.001);
        assert!((preview_weight_loss(3.0, 2.0) - 33.33).abs() < 0.001);
        assert_eq!(preview_weight_loss(0.0, 5.0), 0.0);
    }

    #[test]
    fn test_preview_weight_loss_non_finite() {
        assert_eq!(preview_weight_loss(f64::NAN, 5.0), 0.0);
    }

    #[test]
    fn test_submission_messages_valid() {
        assert!(submission_messages(&submission_json(40)).unwrap().is_empty());
    }

    #[test]
    fn test_submission_messages_reports_rules() {
        let messages = submission_messages(&submission_json(0)).unwrap();
        assert_eq!(messages, vec![ROAST_DURATION_REQUIRED.to_string()]);
    }

    #[test]
    fn test_submission_messages_bad_json() {
        assert!(submission_messages("{\"roastery\": \"Manly Store\"}").is_err());
    }

    #[test]
    fn test_form_options_lists_labels() {
        let options: serde_json::Value = serde_json::from_str(&form_options()).unwrap();
        assert_eq!(options["roasteries"][0], "Martin Place Store");
        assert_eq!(options["roast_levels"][2], "Medium-Dark");
        assert_eq!(options["origins"].as_array().unwrap().len(), Origin::ALL.len());
    }
}
