use crate::features::FeatureVector;
use resara_config::PricingConfig;
use resara_core::{DataKind, Record};
use rust_decimal::prelude::ToPrimitive;

/// Unclamped adjusted discount with its itemized deltas.
///
/// A `None` delta means the rule did not apply to the row (wrong kind,
/// missing date); a `Some(0.0)` means it applied and contributed nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedDiscount {
    pub total: f64,
    pub seasonal: Option<f64>,
    pub weekend: Option<f64>,
    pub competitor: Option<f64>,
    pub competitor_override: bool,
    pub inventory_age: Option<f64>,
}

/// Applies the deterministic business rules on top of a model baseline.
///
/// Deltas are additive except for competitor pressure, which replaces the
/// seasonal/weekend components when it fires: undercutting a live quote is
/// a price target, not a markdown on top of one.
pub struct RuleAdjuster<'a> {
    config: &'a PricingConfig,
}

impl<'a> RuleAdjuster<'a> {
    pub fn new(config: &'a PricingConfig) -> Self {
        Self { config }
    }

    pub fn adjust(&self, baseline: f64, record: &Record, features: &FeatureVector) -> AdjustedDiscount {
        let seasonal = features
            .month
            .map(|m| self.config.seasonal_effect.range_for_month(m).midpoint());

        let weekend = features.is_weekend.map(|weekend| {
            if weekend {
                self.config.weekend_effect.midpoint()
            } else {
                0.0
            }
        });

        let inventory_age = if record.kind == DataKind::Inventory {
            features
                .inventory_age
                .map(|age| self.config.inventory_age.max_delta * age)
        } else {
            None
        };

        let calendar_delta = seasonal.unwrap_or(0.0) + weekend.unwrap_or(0.0);

        let mut competitor = None;
        let mut competitor_override = false;
        if record.kind == DataKind::Competitor {
            if let Some(delta) = self.undercut_delta(baseline + calendar_delta, baseline, record) {
                competitor = Some(delta);
                competitor_override = true;
            }
        }

        let mut total = baseline;
        if competitor_override {
            total += competitor.unwrap_or(0.0);
        } else {
            total += calendar_delta;
        }
        total += inventory_age.unwrap_or(0.0);

        AdjustedDiscount {
            total,
            seasonal,
            weekend,
            competitor,
            competitor_override,
            inventory_age,
        }
    }

    /// Discount delta needed to undercut the lowest competitor quote by the
    /// configured margin, when that quote beats the model-implied price.
    fn undercut_delta(&self, provisional: f64, baseline: f64, record: &Record) -> Option<f64> {
        let face = record.face_value?.to_f64()?;
        if face <= 0.0 {
            return None;
        }
        let min_quote = record.min_competitor_price()?.to_f64()?;

        let model_implied_price = face * (1.0 - provisional);
        if min_quote >= model_implied_price {
            return None;
        }

        let target_price = min_quote * (1.0 - self.config.competitor_undercut_margin);
        let desired_discount = 1.0 - target_price / face;
        Some(desired_discount - baseline)
    }
}
