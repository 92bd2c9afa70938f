//! Permissive coercion of form-style string fields.
//!
//! Writes reach the engine from loosely validated forms, so missing or
//! non-numeric amount and category fields coerce to 0 instead of failing.
//! The exact rules live here so every write path coerces identically.

use crate::category::CategoryId;

/// Coerce a raw amount field to a number.
///
/// The value is trimmed and parsed as a decimal. Anything else — a missing
/// field, an empty string, junk text, or a non-finite result such as "NaN" —
/// becomes 0.0. The sign is preserved; storage-level sign policy is applied
/// by the write paths, not here.
pub fn amount_or_zero(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Coerce a raw category field to a category id, 0 when absent or unparseable.
pub fn category_or_zero(raw: Option<&str>) -> CategoryId {
    raw.and_then(|value| value.trim().parse::<CategoryId>().ok())
        .unwrap_or(0)
}
