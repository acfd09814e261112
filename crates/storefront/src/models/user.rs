//! User and customer domain types.
//!
//! Authentication identities (`User`) and customer profiles (`Customer`) are
//! separate rows paired 1:1. A profile can be missing for an identity that
//! was created outside the checkout flow; the checkout completer handles
//! that case explicitly.

use chrono::{DateTime, Utc};

use sidra_core::{CustomerId, Email, UserId};

/// An authentication identity (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email address.
    pub email: Email,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
}

/// A customer profile paired with an authentication identity.
#[derive(Debug, Clone)]
pub struct Customer {
    /// Unique customer ID (referenced by orders and addresses).
    pub id: CustomerId,
    /// Owning authentication identity.
    pub user_id: UserId,
    /// Customer's full name.
    pub full_name: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email (mirrors the identity email).
    pub email: Email,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
