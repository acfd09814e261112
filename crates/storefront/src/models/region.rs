//! Region (emirate) reference data.

use rust_decimal::Decimal;

/// A delivery region with its fee and bilingual display names.
///
/// Read-only reference data, seeded via `sidra-cli seed regions`.
#[derive(Debug, Clone)]
pub struct Region {
    /// Short region code (e.g. "DXB", "AUH").
    pub code: String,
    /// English display name.
    pub name_en: String,
    /// Arabic display name.
    pub name_ar: String,
    /// Flat delivery fee for this region.
    pub delivery_fee: Decimal,
}
