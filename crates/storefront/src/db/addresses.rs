//! Address repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sidra_core::{AddressId, CustomerId};

use super::RepositoryError;
use crate::models::Address;

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: AddressId,
    customer_id: CustomerId,
    full_name: String,
    phone: String,
    address_line: String,
    region_code: String,
    notes: Option<String>,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(r: AddressRow) -> Self {
        Self {
            id: r.id,
            customer_id: r.customer_id,
            full_name: r.full_name,
            phone: r.phone,
            address_line: r.address_line,
            region_code: r.region_code,
            notes: r.notes,
            is_default: r.is_default,
            created_at: r.created_at,
        }
    }
}

/// Fields for creating a new address.
pub struct NewAddress<'a> {
    /// Recipient full name.
    pub full_name: &'a str,
    /// Recipient phone number.
    pub phone: &'a str,
    /// Free-text address.
    pub address_line: &'a str,
    /// Region (emirate) code.
    pub region_code: &'a str,
    /// Optional delivery notes.
    pub notes: Option<&'a str>,
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an address by ID, scoped to its owner.
    ///
    /// The ownership filter is deliberate: an address ID submitted by a
    /// client is only honored if it belongs to the resolved customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_owned(
        &self,
        address_id: AddressId,
        customer_id: CustomerId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, customer_id, full_name, phone, address_line, region_code,
                   notes, is_default, created_at
            FROM storefront.addresses
            WHERE id = $1 AND customer_id = $2
            ",
        )
        .bind(address_id)
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Address::from))
    }

    /// Create an address for a customer.
    ///
    /// The first address a customer creates becomes their default; the
    /// check and insert run in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        fields: NewAddress<'_>,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM storefront.addresses
            WHERE customer_id = $1
            ",
        )
        .bind(customer_id)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, AddressRow>(
            r"
            INSERT INTO storefront.addresses
                (customer_id, full_name, phone, address_line, region_code, notes, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, customer_id, full_name, phone, address_line, region_code,
                      notes, is_default, created_at
            ",
        )
        .bind(customer_id)
        .bind(fields.full_name)
        .bind(fields.phone)
        .bind(fields.address_line)
        .bind(fields.region_code)
        .bind(fields.notes)
        .bind(existing == 0)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Address::from(row))
    }
}
