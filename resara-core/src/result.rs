use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Row outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    Ok,
    Skipped(String),
    Errored(String),
}

/// Qualitative confidence in a recommendation, graded from inventory age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Itemized account of how a discount was assembled.
///
/// Deltas that did not apply to the row (no date, wrong kind) are `None`,
/// never silently zero. `competitor_override` marks rows where the
/// undercut rule replaced the seasonal/weekend components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountBreakdown {
    pub baseline: f64,
    pub baseline_source: String,
    pub unknown_brand: bool,
    pub seasonal: Option<f64>,
    pub weekend: Option<f64>,
    pub competitor: Option<f64>,
    pub competitor_override: bool,
    pub inventory_age: Option<f64>,
    pub clamped: bool,
    pub confidence: Option<Confidence>,
}

/// Output for one input record. Exactly one of these exists per record in
/// a batch, in input order, whatever the row's fate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    pub record_id: String,
    pub recommended_price: Option<Decimal>,
    pub discount_applied: Option<f64>,
    pub breakdown: Option<DiscountBreakdown>,
    pub status: RowStatus,
}

impl PriceResult {
    pub fn errored(record_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            recommended_price: None,
            discount_applied: None,
            breakdown: None,
            status: RowStatus::Errored(reason.into()),
        }
    }

    pub fn skipped(record_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            recommended_price: None,
            discount_applied: None,
            breakdown: None,
            status: RowStatus::Skipped(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == RowStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let ok = serde_json::to_value(RowStatus::Ok).unwrap();
        assert_eq!(ok["status"], "OK");

        let errored = serde_json::to_value(RowStatus::Errored("missing face_value".into())).unwrap();
        assert_eq!(errored["status"], "ERRORED");
        assert_eq!(errored["reason"], "missing face_value");
    }

    #[test]
    fn test_errored_result_has_no_price() {
        let result = PriceResult::errored("GC-7", "missing face_value");
        assert!(!result.is_ok());
        assert!(result.recommended_price.is_none());
        assert!(result.breakdown.is_none());
    }
}
