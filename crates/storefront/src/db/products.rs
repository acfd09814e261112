//! Product repository.
//!
//! The buy-now flow uses this to snapshot the current price server-side
//! instead of trusting a client-submitted price.

use rust_decimal::Decimal;
use sqlx::PgPool;

use sidra_core::ProductId;

use super::RepositoryError;
use crate::models::Product;

/// Repository for product lookups.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: ProductId,
            sku: String,
            name_en: String,
            name_ar: String,
            price: Decimal,
        }

        let row = sqlx::query_as::<_, Row>(
            r"
            SELECT id, sku, name_en, name_ar, price
            FROM storefront.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| Product {
            id: r.id,
            sku: r.sku,
            name_en: r.name_en,
            name_ar: r.name_ar,
            price: r.price,
        }))
    }
}
