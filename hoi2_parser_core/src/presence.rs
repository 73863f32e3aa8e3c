//! Predicates deciding whether a value is written at all.

/// Quantities smaller than this are treated as absent
pub const QUANTITY_EPSILON: f64 = 1e-4;

/// Magnitude is at least the quantity epsilon; sign is kept (treaty quantities, IC modifiers)
pub fn is_significant(value: f64) -> bool {
    return value.abs() >= QUANTITY_EPSILON;
}

/// Strictly positive and significant (pools, stocks, stats)
pub fn is_positive(value: f64) -> bool {
    return value > 0.0 && is_significant(value);
}

/// Returns the value only when it should be written
pub fn positive(value: f64) -> Option<f64> {
    return is_positive(value).then_some(value);
}

pub fn significant(value: f64) -> Option<f64> {
    return is_significant(value).then_some(value);
}
