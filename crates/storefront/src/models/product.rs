//! Product domain type.

use rust_decimal::Decimal;

use sidra_core::ProductId;

/// A purchasable product.
///
/// Checkout only needs the identity, SKU, bilingual names and current price;
/// catalog presentation lives elsewhere.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Stock keeping unit.
    pub sku: String,
    /// English display name.
    pub name_en: String,
    /// Arabic display name.
    pub name_ar: String,
    /// Current unit price.
    pub price: Decimal,
}
