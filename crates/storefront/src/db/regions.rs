//! Region (emirate) repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Region;

/// Repository for delivery region lookups.
pub struct RegionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RegionRepository<'a> {
    /// Create a new region repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a region by its code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Region>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            code: String,
            name_en: String,
            name_ar: String,
            delivery_fee: Decimal,
        }

        let row = sqlx::query_as::<_, Row>(
            r"
            SELECT code, name_en, name_ar, delivery_fee
            FROM storefront.regions
            WHERE code = $1
            ",
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| Region {
            code: r.code,
            name_en: r.name_en,
            name_ar: r.name_ar,
            delivery_fee: r.delivery_fee,
        }))
    }
}
