use resara_config::DiscountBounds;

/// Clamp a total discount into the configured bounds.
///
/// Returns the bounded value and whether clamping changed it, so callers
/// can tell model-driven prices from policy-capped ones. Non-finite
/// inputs collapse into the range (NaN lands on `min_discount`).
pub fn enforce(bounds: &DiscountBounds, discount: f64) -> (f64, bool) {
    let bounded = discount.max(bounds.min_discount).min(bounds.max_discount);
    (bounded, bounded != discount)
}
