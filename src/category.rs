//! The static category lookup shared by every presentation surface.
//!
//! Categories are plain integer ids on expense rows. Aggregation preserves
//! the raw id, even ids not present in this table; only label resolution is
//! lossy, falling back to [OTHERS_LABEL].

/// Alias for the integer type used for expense category ids.
pub type CategoryId = i64;

/// The label shown for category ids with no entry in the lookup table.
pub const OTHERS_LABEL: &str = "Others";

/// Resolve a category id to its display label.
pub fn category_label(id: CategoryId) -> &'static str {
    match id {
        1 => "Food",
        2 => "Transport",
        3 => "Housing",
        4 => "Utilities",
        5 => "Entertainment",
        6 => "Health",
        7 => "Shopping",
        8 => "Education",
        _ => OTHERS_LABEL,
    }
}
