pub mod record;
pub mod result;

pub use record::{DataKind, Record, UnknownDataType};
pub use result::{Confidence, DiscountBreakdown, PriceResult, RowStatus};
