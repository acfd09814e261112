//! Database operations for the storefront `PostgreSQL`.
//!
//! # Tables (schema `storefront`)
//!
//! - `users` / `user_passwords` - Authentication identities
//! - `customers` - Customer profiles (1:1 with users, referenced by orders)
//! - `addresses` - Customer delivery addresses
//! - `regions` - Delivery regions (emirates) with fees, seeded reference data
//! - `products` - Purchasable products
//! - `orders` / `order_lines` - Orders and their immutable line items
//! - `audit_log` - Checkout audit trail, written by the background sink
//! - `sessions` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p sidra-cli -- migrate
//! ```

pub mod addresses;
pub mod audit;
pub mod orders;
pub mod products;
pub mod regions;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use audit::AuditLogRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use regions::RegionRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Whether the failure looks transient (worth a bounded retry).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))
        )
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
