use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of tabular payload a batch carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Inventory,
    Competitor,
    Historical,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Inventory => "inventory",
            DataKind::Competitor => "competitor",
            DataKind::Historical => "historical",
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown data type: {0}")]
pub struct UnknownDataType(pub String);

impl FromStr for DataKind {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inventory" => Ok(DataKind::Inventory),
            "competitor" => Ok(DataKind::Competitor),
            "historical" => Ok(DataKind::Historical),
            other => Err(UnknownDataType(other.to_string())),
        }
    }
}

/// One priced item, as decoded from a tabular row.
///
/// Required fields are optional here so that a malformed row can still be
/// carried through the batch and reported against its `record_id`; the
/// orchestrator validates before pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub record_id: String,
    pub brand: String,
    pub face_value: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub competitor_prices: Vec<Decimal>,
    pub days_in_inventory: Option<u32>,
    pub days_to_expiry: Option<u32>,
    pub is_digital: Option<bool>,
    pub brand_popularity: Option<u8>,
    pub customer_rating: Option<u8>,
    pub observation_date: Option<NaiveDate>,
    pub kind: DataKind,
}

impl Record {
    /// Create a bare record of the given kind; callers fill in what they have
    pub fn new(record_id: impl Into<String>, brand: impl Into<String>, kind: DataKind) -> Self {
        Self {
            record_id: record_id.into(),
            brand: brand.into(),
            face_value: None,
            current_price: None,
            sale_price: None,
            competitor_prices: Vec::new(),
            days_in_inventory: None,
            days_to_expiry: None,
            is_digital: None,
            brand_popularity: None,
            customer_rating: None,
            observation_date: None,
            kind,
        }
    }

    /// Lowest competitor quote, if any were supplied
    pub fn min_competitor_price(&self) -> Option<Decimal> {
        self.competitor_prices.iter().min().copied()
    }
}
