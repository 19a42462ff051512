//! Tabular boundary: decodes request payloads into typed [`Record`]s.
//!
//! Parsing is quoting/escaping aware. A cell that fails typed parsing
//! leaves its field `None`, so the row still reaches the pipeline and is
//! reported against its own id instead of poisoning the batch; a required
//! COLUMN missing from the header is a schema error for the whole payload.

use chrono::NaiveDate;
use resara_core::{DataKind, Record, UnknownDataType};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    UnknownDataType(#[from] UnknownDataType),

    #[error("{kind} payload missing required column: {column}")]
    MissingColumn { kind: DataKind, column: &'static str },

    #[error("csv decode failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Decode a request payload: parse the data kind, then the rows
pub fn decode_request(data_type: &str, csv_data: &str) -> Result<(DataKind, Vec<Record>), IngestError> {
    let kind = data_type.parse::<DataKind>()?;
    let records = decode(kind, csv_data)?;
    Ok((kind, records))
}

/// Decode one CSV payload of the given kind into records
pub fn decode(kind: DataKind, csv_data: &str) -> Result<Vec<Record>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    check_schema(kind, &headers)?;

    let mut records = Vec::new();
    match kind {
        DataKind::Inventory => {
            for (index, row) in reader.deserialize::<InventoryRow>().enumerate() {
                records.push(row?.into_record(index));
            }
        }
        DataKind::Competitor => {
            for (index, row) in reader.deserialize::<CompetitorRow>().enumerate() {
                records.push(row?.into_record(index));
            }
        }
        DataKind::Historical => {
            for (index, row) in reader.deserialize::<HistoricalRow>().enumerate() {
                records.push(row?.into_record(index));
            }
        }
    }
    Ok(records)
}

const COMPETITOR_PRICE_COLUMNS: [&str; 3] =
    ["competitor1_price", "competitor2_price", "competitor3_price"];

fn check_schema(kind: DataKind, headers: &[String]) -> Result<(), IngestError> {
    let has = |column: &str| headers.iter().any(|h| h == column);

    if !(has("brand") || has("gift_card_type")) {
        return Err(IngestError::MissingColumn { kind, column: "brand" });
    }

    let required: &[&'static str] = match kind {
        DataKind::Inventory => &[
            "face_value",
            "current_price",
            "days_in_inventory",
            "is_digital",
            "brand_popularity",
        ],
        DataKind::Competitor => &["face_value"],
        DataKind::Historical => &[
            "face_value",
            "sale_date",
            "sale_price",
            "customer_rating",
            "days_to_expiry",
            "is_digital",
            "brand_popularity",
        ],
    };
    for &column in required {
        if !has(column) {
            return Err(IngestError::MissingColumn { kind, column });
        }
    }

    if kind == DataKind::Competitor && !COMPETITOR_PRICE_COLUMNS.iter().any(|c| has(c)) {
        return Err(IngestError::MissingColumn {
            kind,
            column: "competitor1_price",
        });
    }

    Ok(())
}

/// Typed-but-forgiving cell parse: empty or malformed cells become `None`
/// so the pipeline can account for the row instead of the decoder dropping it
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let s = s.trim();
        if s.is_empty() {
            None
        } else {
            s.parse::<T>().ok()
        }
    }))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.trim() {
        "0" => Some(false),
        "1" => Some(true),
        other => other.parse::<bool>().ok(),
    }))
}

fn row_id(explicit: Option<String>, index: usize) -> String {
    explicit
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("row-{}", index + 1))
}

#[derive(Debug, Deserialize)]
struct InventoryRow {
    #[serde(default, alias = "gift_card_id")]
    record_id: Option<String>,
    #[serde(default, alias = "gift_card_type")]
    brand: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    face_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    current_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    days_in_inventory: Option<u32>,
    #[serde(default, deserialize_with = "lenient_bool")]
    is_digital: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    brand_popularity: Option<u8>,
}

impl InventoryRow {
    fn into_record(self, index: usize) -> Record {
        let mut record = Record::new(
            row_id(self.record_id, index),
            self.brand.unwrap_or_default(),
            DataKind::Inventory,
        );
        record.face_value = self.face_value;
        record.current_price = self.current_price;
        record.days_in_inventory = self.days_in_inventory;
        record.is_digital = self.is_digital;
        record.brand_popularity = self.brand_popularity;
        record
    }
}

#[derive(Debug, Deserialize)]
struct CompetitorRow {
    #[serde(default, alias = "gift_card_id")]
    record_id: Option<String>,
    #[serde(default, alias = "gift_card_type")]
    brand: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    face_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    competitor1_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    competitor2_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    competitor3_price: Option<Decimal>,
}

impl CompetitorRow {
    fn into_record(self, index: usize) -> Record {
        let mut record = Record::new(
            row_id(self.record_id, index),
            self.brand.unwrap_or_default(),
            DataKind::Competitor,
        );
        record.face_value = self.face_value;
        record.competitor_prices = [
            self.competitor1_price,
            self.competitor2_price,
            self.competitor3_price,
        ]
        .into_iter()
        .flatten()
        .collect();
        record
    }
}

#[derive(Debug, Deserialize)]
struct HistoricalRow {
    #[serde(default, alias = "gift_card_id")]
    record_id: Option<String>,
    #[serde(default, alias = "gift_card_type")]
    brand: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    face_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    sale_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    sale_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    customer_rating: Option<u8>,
    #[serde(default, deserialize_with = "lenient")]
    days_to_expiry: Option<u32>,
    #[serde(default, deserialize_with = "lenient_bool")]
    is_digital: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    brand_popularity: Option<u8>,
}

impl HistoricalRow {
    fn into_record(self, index: usize) -> Record {
        let mut record = Record::new(
            row_id(self.record_id, index),
            self.brand.unwrap_or_default(),
            DataKind::Historical,
        );
        record.face_value = self.face_value;
        record.sale_price = self.sale_price;
        record.customer_rating = self.customer_rating;
        record.days_to_expiry = self.days_to_expiry;
        record.is_digital = self.is_digital;
        record.brand_popularity = self.brand_popularity;
        record.observation_date = self.sale_date;
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_inventory_payload() {
        let csv = "\
gift_card_id,gift_card_type,face_value,current_price,days_in_inventory,is_digital,brand_popularity
GC-INV-1,Amazon,100,95.00,12,1,85
GC-INV-2,\"Best Buy\",50,44.00,40,0,70
";
        let records = decode(DataKind::Inventory, csv).expect("decodes");
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].record_id, "GC-INV-1");
        assert_eq!(records[0].brand, "Amazon");
        assert_eq!(records[0].face_value, Some(Decimal::from(100)));
        assert_eq!(records[0].is_digital, Some(true));

        assert_eq!(records[1].brand, "Best Buy");
        assert_eq!(records[1].days_in_inventory, Some(40));
    }

    #[test]
    fn test_quoted_cells_with_embedded_commas() {
        let csv = "\
record_id,brand,face_value,current_price,days_in_inventory,is_digital,brand_popularity
GC-1,\"Cards, Unlimited\",25,22.50,5,0,60
";
        let records = decode(DataKind::Inventory, csv).expect("decodes");
        assert_eq!(records[0].brand, "Cards, Unlimited");
    }

    #[test]
    fn test_malformed_cell_becomes_missing_field() {
        let csv = "\
record_id,brand,face_value,current_price,days_in_inventory,is_digital,brand_popularity
GC-1,Amazon,not-a-number,95.00,12,1,85
";
        let records = decode(DataKind::Inventory, csv).expect("row is kept");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].face_value, None);
    }

    #[test]
    fn test_missing_row_id_is_synthesized() {
        let csv = "\
brand,face_value,current_price,days_in_inventory,is_digital,brand_popularity
Amazon,100,95.00,12,1,85
Target,50,45.00,3,0,75
";
        let records = decode(DataKind::Inventory, csv).expect("decodes");
        assert_eq!(records[0].record_id, "row-1");
        assert_eq!(records[1].record_id, "row-2");
    }

    #[test]
    fn test_decode_competitor_payload() {
        let csv = "\
brand,face_value,competitor1_price,competitor2_price,competitor3_price
Amazon,100,94.50,91.20,
";
        let records = decode(DataKind::Competitor, csv).expect("decodes");
        assert_eq!(records[0].competitor_prices.len(), 2);
        assert_eq!(records[0].min_competitor_price(), Some(Decimal::new(9120, 2)));
    }

    #[test]
    fn test_decode_historical_payload() {
        let csv = "\
gift_card_id,gift_card_type,face_value,sale_date,sale_price,customer_rating,days_to_expiry,is_digital,brand_popularity
GC-7,Starbucks,25,2024-12-07,22.75,4,365,1,78
";
        let records = decode(DataKind::Historical, csv).expect("decodes");
        let record = &records[0];
        assert_eq!(record.observation_date, NaiveDate::from_ymd_opt(2024, 12, 7));
        assert_eq!(record.sale_price, Some(Decimal::new(2275, 2)));
        assert_eq!(record.customer_rating, Some(4));
    }

    #[test]
    fn test_missing_required_column_rejected() {
        let csv = "\
brand,current_price,days_in_inventory,is_digital,brand_popularity
Amazon,95.00,12,1,85
";
        let err = decode(DataKind::Inventory, csv).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn { column: "face_value", .. }
        ));
    }

    #[test]
    fn test_competitor_payload_needs_a_price_column() {
        let csv = "brand,face_value\nAmazon,100\n";
        let err = decode(DataKind::Competitor, csv).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { .. }));
    }

    #[test]
    fn test_unknown_data_type_rejected_before_parsing() {
        let err = decode_request("telemetry", "brand,face_value\n").unwrap_err();
        assert!(matches!(err, IngestError::UnknownDataType(_)));
    }
}
