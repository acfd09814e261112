//! Client-submitted cart lines.
//!
//! The cart itself lives in the browser; the server only sees its lines at
//! checkout time and discards them once an order is placed.

use rust_decimal::Decimal;
use serde::Deserialize;

use sidra_core::ProductId;

/// One line of a client cart, with the price snapshot the client saw.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Quantity (must be a positive integer).
    pub quantity: u32,
    /// Unit price snapshot at the time the line entered the cart.
    pub unit_price: Decimal,
}

impl CartLine {
    /// Line total: `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Sum of all line totals.
#[must_use]
pub fn subtotal(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(product: i32, price: &str, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(product),
            quantity,
            unit_price: price.parse().unwrap(),
        }
    }

    #[test]
    fn test_subtotal_sums_line_totals() {
        // 50 x 2 + 30 x 1 = 130
        let lines = vec![line(1, "50.00", 2), line(2, "30.00", 1)];
        assert_eq!(subtotal(&lines), "130.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_subtotal_empty_is_zero() {
        assert_eq!(subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_line_total_keeps_decimal_precision() {
        let l = line(1, "19.95", 3);
        assert_eq!(l.line_total(), "59.85".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_deserializes_camel_case() {
        let l: CartLine =
            serde_json::from_str(r#"{"productId":4,"quantity":2,"unitPrice":"12.50"}"#).unwrap();
        assert_eq!(l.product_id, ProductId::new(4));
        assert_eq!(l.quantity, 2);
    }
}
