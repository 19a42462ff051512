use chrono::Datelike;
use resara_config::PricingConfig;
use resara_core::Record;
use rust_decimal::prelude::ToPrimitive;

/// Largest denomination in circulation; face values normalize against it
const FACE_VALUE_SCALE: f64 = 500.0;

/// Normalized per-record inputs to the discount model and rule adjuster
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub brand_base_discount: f64,
    pub unknown_brand: bool,
    /// Brand popularity scaled to [0,1]
    pub popularity: Option<f64>,
    /// Inventory age against the configured ramp, in [0,1]
    pub inventory_age: Option<f64>,
    /// Face value against the largest denomination, in [0,1]
    pub face_value: Option<f64>,
    pub is_digital: bool,
    pub month: Option<u32>,
    pub is_weekend: Option<bool>,
}

impl FeatureVector {
    /// Derive features for one record. Pure; missing optional inputs stay
    /// `None` so downstream components can omit rather than zero them.
    pub fn extract(record: &Record, config: &PricingConfig) -> Self {
        let (brand_base_discount, known_brand) = config.brand_base_discount(&record.brand);

        let popularity = record
            .brand_popularity
            .map(|p| f64::from(p.min(100)) / 100.0);

        let ramp_days = config.inventory_age.ramp_days;
        let inventory_age = record
            .days_in_inventory
            .map(|d| (f64::from(d) / f64::from(ramp_days)).min(1.0));

        let face_value = record
            .face_value
            .and_then(|f| f.to_f64())
            .map(|f| (f / FACE_VALUE_SCALE).min(1.0));

        let month = record.observation_date.map(|d| d.month());
        let is_weekend = record
            .observation_date
            .map(|d| d.weekday().number_from_monday() > 5);

        Self {
            brand_base_discount,
            unknown_brand: !known_brand,
            popularity,
            inventory_age,
            face_value,
            is_digital: record.is_digital.unwrap_or(false),
            month,
            is_weekend,
        }
    }
}
