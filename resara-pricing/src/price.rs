use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("discount is not a finite fraction: {0}")]
    NonFiniteDiscount(f64),
}

/// `face_value * (1 - discount)`, rounded to cents.
///
/// Rounding rule: half-up (midpoint away from zero), so 90.125 prices at
/// 90.13. For any discount inside a valid bounds range the result stays in
/// `(0, face_value]`.
pub fn compute(face_value: Decimal, discount: f64) -> Result<Decimal, PriceError> {
    let discount = Decimal::from_f64(discount).ok_or(PriceError::NonFiniteDiscount(discount))?;
    let price = face_value * (Decimal::ONE - discount);
    Ok(price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}
