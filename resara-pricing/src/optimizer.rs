use crate::bounds;
use crate::features::FeatureVector;
use crate::model::DiscountModel;
use crate::price::{self, PriceError};
use crate::rules::RuleAdjuster;
use resara_config::PricingConfig;
use resara_core::{Confidence, DataKind, DiscountBreakdown, PriceResult, Record, RowStatus};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Stages a batch (and each row within it) moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStage {
    Received,
    Validating,
    Scoring,
    Adjusting,
    Bounding,
    Pricing,
    Completed,
}

#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid {field}: {detail}")]
    InvalidValue { field: &'static str, detail: String },

    #[error(transparent)]
    Price(#[from] PriceError),
}

/// Drives the pricing pipeline over a batch of records.
///
/// Holds an immutable config and an injected, already-loaded model handle;
/// it never loads artifacts itself. One malformed row never aborts the
/// batch: output has exactly one result per input record, in input order.
pub struct Optimizer {
    config: PricingConfig,
    model: Arc<dyn DiscountModel>,
}

impl Optimizer {
    pub fn new(config: PricingConfig, model: Arc<dyn DiscountModel>) -> Self {
        Self { config, model }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn optimize(&self, records: &[Record]) -> Vec<PriceResult> {
        self.run(records, None)
    }

    /// Like `optimize`, but checks the flag before dispatching each row.
    /// Once raised, remaining rows are marked `Skipped` and work already
    /// completed is returned as-is.
    pub fn optimize_with_cancel(&self, records: &[Record], cancel: &AtomicBool) -> Vec<PriceResult> {
        self.run(records, Some(cancel))
    }

    fn run(&self, records: &[Record], cancel: Option<&AtomicBool>) -> Vec<PriceResult> {
        let batch_id = Uuid::new_v4();
        tracing::debug!(%batch_id, rows = records.len(), stage = ?BatchStage::Received, "batch received");

        let adjuster = RuleAdjuster::new(&self.config);
        let mut results = Vec::with_capacity(records.len());
        let mut cancelled = false;

        for record in records {
            if !cancelled {
                if let Some(flag) = cancel {
                    if flag.load(Ordering::Relaxed) {
                        cancelled = true;
                        tracing::warn!(%batch_id, completed = results.len(), "batch cancelled, skipping remaining rows");
                    }
                }
            }
            if cancelled {
                results.push(PriceResult::skipped(&record.record_id, "batch cancelled"));
                continue;
            }

            match self.price_record(record, &adjuster) {
                Ok(result) => results.push(result),
                Err(err) => {
                    tracing::debug!(%batch_id, record_id = %record.record_id, error = %err, "row errored");
                    results.push(PriceResult::errored(&record.record_id, err.to_string()));
                }
            }
        }

        let ok = results.iter().filter(|r| r.is_ok()).count();
        tracing::debug!(%batch_id, ok, total = results.len(), stage = ?BatchStage::Completed, "batch completed");
        results
    }

    /// Walk one record through Validating -> Scoring -> Adjusting ->
    /// Bounding -> Pricing.
    fn price_record(&self, record: &Record, adjuster: &RuleAdjuster) -> Result<PriceResult, RowError> {
        let record_id = record.record_id.as_str();

        tracing::trace!(record_id, stage = ?BatchStage::Validating, "row stage");
        let face_value = validate(record)?;

        tracing::trace!(record_id, stage = ?BatchStage::Scoring, "row stage");
        let features = FeatureVector::extract(record, &self.config);
        let baseline = self.model.score(&features);

        tracing::trace!(record_id, stage = ?BatchStage::Adjusting, "row stage");
        let adjusted = adjuster.adjust(baseline, record, &features);

        tracing::trace!(record_id, stage = ?BatchStage::Bounding, "row stage");
        let (discount, clamped) = bounds::enforce(&self.config.discount_bounds, adjusted.total);

        tracing::trace!(record_id, stage = ?BatchStage::Pricing, "row stage");
        let recommended_price = price::compute(face_value, discount)?;

        let breakdown = DiscountBreakdown {
            baseline,
            baseline_source: format!("{}:{}", self.model.name(), self.model.version()),
            unknown_brand: features.unknown_brand,
            seasonal: adjusted.seasonal,
            weekend: adjusted.weekend,
            competitor: adjusted.competitor,
            competitor_override: adjusted.competitor_override,
            inventory_age: adjusted.inventory_age,
            clamped,
            confidence: confidence(record),
        };

        Ok(PriceResult {
            record_id: record.record_id.clone(),
            recommended_price: Some(recommended_price),
            discount_applied: Some(discount),
            breakdown: Some(breakdown),
            status: RowStatus::Ok,
        })
    }
}

fn validate(record: &Record) -> Result<Decimal, RowError> {
    if record.brand.trim().is_empty() {
        return Err(RowError::MissingField("brand"));
    }
    let face_value = record.face_value.ok_or(RowError::MissingField("face_value"))?;
    if face_value <= Decimal::ZERO {
        return Err(RowError::InvalidValue {
            field: "face_value",
            detail: face_value.to_string(),
        });
    }
    Ok(face_value)
}

/// Confidence grade for inventory recommendations: very fresh or very old
/// stock has thin comparable-sales signal.
fn confidence(record: &Record) -> Option<Confidence> {
    if record.kind != DataKind::Inventory {
        return None;
    }
    let days = record.days_in_inventory?;
    Some(match days {
        0..=2 => Confidence::Low,
        3..=6 => Confidence::Medium,
        7..=30 => Confidence::High,
        31..=60 => Confidence::Medium,
        _ => Confidence::Low,
    })
}
