//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use sidra_core::{AddressId, CustomerId, OrderCode, OrderId, OrderStatus, PaymentMethod};

use super::{Address, Customer};

/// An order row.
///
/// `customer_id` and `address_id` stay empty while the order is a draft and
/// are attached when checkout completes. Once `status` becomes `Confirmed`,
/// `total_price == subtotal + shipping` holds.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Human-readable order code.
    pub code: OrderCode,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Sum of line totals at draft time.
    pub subtotal: Decimal,
    /// Delivery fee (zero until checkout completes).
    pub shipping: Decimal,
    /// Final total (`subtotal` until checkout completes).
    pub total_price: Decimal,
    /// Payment method (always cash on delivery).
    pub payment_method: PaymentMethod,
    /// Purchasing customer, attached at completion.
    pub customer_id: Option<CustomerId>,
    /// Delivery address, attached at completion.
    pub address_id: Option<AddressId>,
    /// Free-text note from the customer.
    pub user_note: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A line of the confirmation view, joined with its product snapshot.
#[derive(Debug, Clone)]
pub struct OrderConfirmationLine {
    /// English product name.
    pub name_en: String,
    /// Arabic product name.
    pub name_ar: String,
    /// Product SKU.
    pub sku: String,
    /// Quantity ordered.
    pub quantity: u32,
    /// Unit price snapshot.
    pub unit_price: Decimal,
}

impl OrderConfirmationLine {
    /// Line total: `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The full order graph used for confirmation emails: the order, its lines
/// with product snapshots, the customer and the delivery address.
#[derive(Debug, Clone)]
pub struct OrderConfirmation {
    /// The confirmed order.
    pub order: Order,
    /// Line items with product details.
    pub lines: Vec<OrderConfirmationLine>,
    /// Purchasing customer.
    pub customer: Customer,
    /// Delivery address.
    pub address: Address,
    /// English name of the delivery region.
    pub region_name_en: String,
    /// Arabic name of the delivery region.
    pub region_name_ar: String,
}
