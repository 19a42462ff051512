//! Synthetic fixture generation for demos and tests.
//!
//! Every generator takes the RNG it should draw from; reproducibility is
//! the caller's choice of seed, never ambient global state.

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use resara_config::{DeltaRange, PricingConfig};
use resara_pricing::{bounds, price};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

pub const GIFT_CARD_BRANDS: [&str; 10] = [
    "Amazon",
    "Walmart",
    "Target",
    "Best Buy",
    "Starbucks",
    "iTunes",
    "Google Play",
    "Nike",
    "Visa",
    "Mastercard",
];

pub const FACE_VALUES: [u32; 5] = [25, 50, 100, 200, 500];

#[derive(Debug, Clone, Serialize)]
pub struct HistoricalFixture {
    pub gift_card_id: String,
    pub gift_card_type: String,
    pub face_value: u32,
    pub sale_date: NaiveDate,
    pub sale_price: Decimal,
    pub customer_rating: u8,
    pub days_to_expiry: u32,
    pub is_digital: u8,
    pub brand_popularity: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryFixture {
    pub gift_card_id: String,
    pub gift_card_type: String,
    pub face_value: u32,
    pub current_price: Decimal,
    pub acquisition_price: Decimal,
    pub days_in_inventory: u32,
    pub is_digital: u8,
    pub brand_popularity: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetitorFixture {
    pub brand: String,
    pub face_value: u32,
    pub competitor1_price: Decimal,
    pub competitor2_price: Decimal,
    pub competitor3_price: Decimal,
}

fn sample(range: &DeltaRange, rng: &mut impl Rng) -> f64 {
    if range.low == range.high {
        range.low
    } else {
        rng.gen_range(range.low..=range.high)
    }
}

fn pick<'a, T>(items: &'a [T], rng: &mut impl Rng) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn priced(face_value: u32, discount: f64, config: &PricingConfig) -> Decimal {
    let (discount, _) = bounds::enforce(&config.discount_bounds, discount);
    // Discount is bounded and finite here, so pricing cannot fail
    price::compute(Decimal::from(face_value), discount)
        .unwrap_or_else(|_| Decimal::from(face_value))
}

/// Six months of plausible sales, seasonal and weekend noise included
pub fn generate_historical(
    rng: &mut impl Rng,
    config: &PricingConfig,
    count: usize,
    start_date: NaiveDate,
) -> Vec<HistoricalFixture> {
    (0..count)
        .map(|i| {
            let brand = *pick(&GIFT_CARD_BRANDS, rng);
            let face_value = *pick(&FACE_VALUES, rng);
            let sale_date = start_date + Duration::days(rng.gen_range(0..=180));

            let (base, _) = config.brand_base_discount(brand);
            let seasonal_range = config.seasonal_effect.range_for_month(sale_date.month());
            let mut discount = base + sample(seasonal_range, rng);
            if sale_date.weekday().number_from_monday() > 5 {
                discount += sample(&config.weekend_effect, rng);
            }

            HistoricalFixture {
                gift_card_id: format!("GC-{}", i + 1),
                gift_card_type: brand.to_string(),
                face_value,
                sale_date,
                sale_price: priced(face_value, discount, config),
                customer_rating: rng.gen_range(3..=5),
                days_to_expiry: rng.gen_range(90..=730),
                is_digital: rng.gen_range(0..=1),
                brand_popularity: rng.gen_range(60..=100),
            }
        })
        .collect()
}

/// Current stock with brand-typical pricing plus listing noise
pub fn generate_inventory(
    rng: &mut impl Rng,
    config: &PricingConfig,
    count: usize,
) -> Vec<InventoryFixture> {
    (0..count)
        .map(|i| {
            let brand = *pick(&GIFT_CARD_BRANDS, rng);
            let face_value = *pick(&FACE_VALUES, rng);

            let (base, _) = config.brand_base_discount(brand);
            let discount = base + rng.gen_range(-0.02..=0.02);
            let current_price = priced(face_value, discount, config);
            let acquisition_price = (current_price * Decimal::new(9, 1))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

            InventoryFixture {
                gift_card_id: format!("GC-INV-{}", i + 1),
                gift_card_type: brand.to_string(),
                face_value,
                current_price,
                acquisition_price,
                days_in_inventory: rng.gen_range(0..=60),
                is_digital: rng.gen_range(0..=1),
                brand_popularity: rng.gen_range(60..=100),
            }
        })
        .collect()
}

fn competitor_quote(face_value: u32, low: f64, high: f64, rng: &mut impl Rng) -> Decimal {
    let discount = Decimal::from_f64(rng.gen_range(low..=high)).unwrap_or_default();
    (Decimal::from(face_value) * (Decimal::ONE - discount))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One quote grid row per brand and denomination; the three competitors
/// carry deliberately different discount appetites
pub fn generate_competitor(rng: &mut impl Rng) -> Vec<CompetitorFixture> {
    let mut fixtures = Vec::with_capacity(GIFT_CARD_BRANDS.len() * FACE_VALUES.len());
    for brand in GIFT_CARD_BRANDS {
        for face_value in FACE_VALUES {
            fixtures.push(CompetitorFixture {
                brand: brand.to_string(),
                face_value,
                competitor1_price: competitor_quote(face_value, 0.03, 0.12, rng),
                competitor2_price: competitor_quote(face_value, 0.05, 0.15, rng),
                competitor3_price: competitor_quote(face_value, 0.02, 0.10, rng),
            });
        }
    }
    fixtures
}
