//! Delivery address domain type.

use chrono::{DateTime, Utc};

use sidra_core::{AddressId, CustomerId};

/// A customer delivery address.
#[derive(Debug, Clone)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Recipient full name.
    pub full_name: String,
    /// Recipient phone number.
    pub phone: String,
    /// Free-text address (street, building, apartment).
    pub address_line: String,
    /// Region (emirate) code, resolves the delivery fee.
    pub region_code: String,
    /// Optional delivery notes.
    pub notes: Option<String>,
    /// Whether this is the customer's default address.
    pub is_default: bool,
    /// When the address was created.
    pub created_at: DateTime<Utc>,
}
