use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub artifact_path: String,
    #[serde(default = "default_true")]
    pub allow_heuristic_fallback: bool,
}

fn default_true() -> bool {
    true
}

/// Inclusive delta range. The optimizer applies the midpoint; the fixture
/// generator samples the full range.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DeltaRange {
    pub low: f64,
    pub high: f64,
}

impl DeltaRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeasonalEffect {
    pub high_season_months: BTreeSet<u32>,
    pub high_season: DeltaRange,
    pub secondary_season_months: BTreeSet<u32>,
    pub secondary_season: DeltaRange,
    pub off_season: DeltaRange,
}

impl SeasonalEffect {
    /// Delta range in effect for a calendar month (1-12)
    pub fn range_for_month(&self, month: u32) -> &DeltaRange {
        if self.high_season_months.contains(&month) {
            &self.high_season
        } else if self.secondary_season_months.contains(&month) {
            &self.secondary_season
        } else {
            &self.off_season
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscountBounds {
    pub min_discount: f64,
    pub max_discount: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryAgeEffect {
    pub max_delta: f64,
    pub ramp_days: u32,
}

/// Validated pricing policy. Construct via deserialization and call
/// `validate` before use; `Config::load` does both.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    pub brand_discount: HashMap<String, f64>,
    #[serde(default = "default_brand_discount")]
    pub default_brand_discount: f64,
    pub seasonal_effect: SeasonalEffect,
    pub weekend_effect: DeltaRange,
    pub discount_bounds: DiscountBounds,
    #[serde(default = "default_undercut_margin")]
    pub competitor_undercut_margin: f64,
    pub inventory_age: InventoryAgeEffect,
}

fn default_brand_discount() -> f64 {
    0.10
}

fn default_undercut_margin() -> f64 {
    0.01
}

impl PricingConfig {
    /// Base discount for a brand, and whether the brand was recognized.
    /// Lookup is case-insensitive: file-based config sources may fold key
    /// case, and feed data is not reliably cased either.
    pub fn brand_base_discount(&self, brand: &str) -> (f64, bool) {
        if let Some(d) = self.brand_discount.get(brand) {
            return (*d, true);
        }
        if let Some(d) = self
            .brand_discount
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(brand))
            .map(|(_, d)| *d)
        {
            return (d, true);
        }
        (self.default_brand_discount, false)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = &self.discount_bounds;
        if !(0.0..=1.0).contains(&bounds.min_discount)
            || !(0.0..=1.0).contains(&bounds.max_discount)
            || bounds.min_discount >= bounds.max_discount
        {
            return Err(ConfigError::InvalidBounds {
                min: bounds.min_discount,
                max: bounds.max_discount,
            });
        }

        for (brand, discount) in &self.brand_discount {
            if !(0.0..=1.0).contains(discount) {
                return Err(ConfigError::FractionOutOfRange {
                    field: "brand_discount",
                    detail: format!("{brand}={discount}"),
                });
            }
        }
        check_fraction("default_brand_discount", self.default_brand_discount)?;
        check_fraction("competitor_undercut_margin", self.competitor_undercut_margin)?;
        check_fraction("inventory_age.max_delta", self.inventory_age.max_delta)?;
        if self.inventory_age.ramp_days == 0 {
            return Err(ConfigError::InvalidRampDays);
        }

        check_range("seasonal_effect.high_season", &self.seasonal_effect.high_season)?;
        check_range(
            "seasonal_effect.secondary_season",
            &self.seasonal_effect.secondary_season,
        )?;
        check_range("seasonal_effect.off_season", &self.seasonal_effect.off_season)?;
        check_range("weekend_effect", &self.weekend_effect)?;
        if self.weekend_effect.low < 0.0 {
            return Err(ConfigError::FractionOutOfRange {
                field: "weekend_effect",
                detail: format!("low={}", self.weekend_effect.low),
            });
        }

        for month in self
            .seasonal_effect
            .high_season_months
            .iter()
            .chain(&self.seasonal_effect.secondary_season_months)
        {
            if !(1..=12).contains(month) {
                return Err(ConfigError::InvalidMonth {
                    field: "seasonal_effect",
                    month: *month,
                });
            }
        }

        Ok(())
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange {
            field,
            detail: format!("{value}"),
        })
    }
}

fn check_range(field: &'static str, range: &DeltaRange) -> Result<(), ConfigError> {
    if range.low <= range.high {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange {
            field,
            low: range.low,
            high: range.high,
        })
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            brand_discount: {
                let mut m = HashMap::new();
                m.insert("Amazon".to_string(), 0.05);
                m.insert("Walmart".to_string(), 0.08);
                m.insert("Target".to_string(), 0.10);
                m.insert("Best Buy".to_string(), 0.12);
                m.insert("Starbucks".to_string(), 0.06);
                m.insert("iTunes".to_string(), 0.15);
                m.insert("Google Play".to_string(), 0.15);
                m.insert("Nike".to_string(), 0.10);
                m.insert("Visa".to_string(), 0.03);
                m.insert("Mastercard".to_string(), 0.04);
                m
            },
            default_brand_discount: 0.10,
            seasonal_effect: SeasonalEffect {
                high_season_months: BTreeSet::from([11, 12]),
                high_season: DeltaRange::new(0.02, 0.05),
                secondary_season_months: BTreeSet::from([1, 6, 7]),
                secondary_season: DeltaRange::new(0.01, 0.03),
                off_season: DeltaRange::new(-0.01, 0.01),
            },
            weekend_effect: DeltaRange::new(0.01, 0.02),
            discount_bounds: DiscountBounds {
                min_discount: 0.01,
                max_discount: 0.25,
            },
            competitor_undercut_margin: 0.01,
            inventory_age: InventoryAgeEffect {
                max_delta: 0.05,
                ramp_days: 30,
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("discount bounds invalid: min={min}, max={max} (need 0 <= min < max <= 1)")]
    InvalidBounds { min: f64, max: f64 },

    #[error("{field} must lie in [0,1]: {detail}")]
    FractionOutOfRange { field: &'static str, detail: String },

    #[error("{field} range has low {low} > high {high}")]
    InvalidRange { field: &'static str, low: f64, high: f64 },

    #[error("{field} month {month} outside 1..=12")]
    InvalidMonth { field: &'static str, month: u32 },

    #[error("inventory_age.ramp_days must be at least 1")]
    InvalidRampDays,

    #[error("configuration source error: {0}")]
    Source(#[from] config::ConfigError),
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file (not checked in to git)
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of RESARA)
            // Eg.. `RESARA_SERVER__PORT=8080` would set `server.port`
            .add_source(config::Environment::with_prefix("RESARA").separator("__"))
            .build()?;

        let loaded: Self = s.try_deserialize()?;
        loaded.pricing.validate()?;
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pricing_config_is_valid() {
        let config = PricingConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = PricingConfig::default();
        config.discount_bounds = DiscountBounds {
            min_discount: 0.30,
            max_discount: 0.25,
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds { .. }));
    }

    #[test]
    fn test_brand_discount_out_of_range_rejected() {
        let mut config = PricingConfig::default();
        config.brand_discount.insert("Acme".to_string(), 1.3);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::FractionOutOfRange { field: "brand_discount", .. }));
    }

    #[test]
    fn test_invalid_month_rejected() {
        let mut config = PricingConfig::default();
        config.seasonal_effect.high_season_months.insert(13);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMonth { month: 13, .. }));
    }

    #[test]
    fn test_inverted_delta_range_rejected() {
        let mut config = PricingConfig::default();
        config.weekend_effect = DeltaRange::new(0.05, 0.01);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { field: "weekend_effect", .. }));
    }

    #[test]
    fn test_unknown_brand_falls_back_to_default() {
        let config = PricingConfig::default();
        assert_eq!(config.brand_base_discount("Amazon"), (0.05, true));
        assert_eq!(config.brand_base_discount("Acme"), (0.10, false));
    }

    #[test]
    fn test_brand_lookup_ignores_case() {
        let config = PricingConfig::default();
        assert_eq!(config.brand_base_discount("amazon"), (0.05, true));
        assert_eq!(config.brand_base_discount("BEST BUY"), (0.12, true));
    }

    #[test]
    fn test_seasonal_range_selection() {
        let config = PricingConfig::default();
        let seasonal = &config.seasonal_effect;
        assert_eq!(seasonal.range_for_month(12), &DeltaRange::new(0.02, 0.05));
        assert_eq!(seasonal.range_for_month(6), &DeltaRange::new(0.01, 0.03));
        assert_eq!(seasonal.range_for_month(3), &DeltaRange::new(-0.01, 0.01));
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(DeltaRange::new(0.02, 0.05).midpoint(), 0.035);
        assert_eq!(DeltaRange::new(-0.01, 0.01).midpoint(), 0.0);
    }
}
