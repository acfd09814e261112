//! Order repository.
//!
//! Multi-row writes (order + lines, confirmation updates) run inside a
//! single transaction so a failure cannot leave an orphan draft or a
//! half-confirmed order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use sidra_core::{AddressId, CustomerId, Email, OrderCode, OrderId, OrderStatus, PaymentMethod, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderConfirmation, OrderConfirmationLine};
use crate::models::{Address, CartLine, Customer};

// `code`, `status` and `payment_method` stay raw here; `into_order`
// re-validates them so corrupted rows surface as `DataCorruption`.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    code: String,
    status: String,
    subtotal: Decimal,
    shipping: Decimal,
    total_price: Decimal,
    payment_method: String,
    customer_id: Option<CustomerId>,
    address_id: Option<AddressId>,
    user_note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let code = OrderCode::parse(&self.code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order code in database: {e}"))
        })?;
        let status: OrderStatus = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;
        let payment_method: PaymentMethod = self.payment_method.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment method in database: {e}"))
        })?;

        Ok(Order {
            id: self.id,
            code,
            status,
            subtotal: self.subtotal,
            shipping: self.shipping,
            total_price: self.total_price,
            payment_method,
            customer_id: self.customer_id,
            address_id: self.address_id,
            user_note: self.user_note,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ORDER: &str = r"
    SELECT id, code, status, subtotal, shipping, total_price, payment_method,
           customer_id, address_id, user_note, created_at, updated_at
    FROM storefront.orders
";

/// Parameters for confirming a draft order.
pub struct ConfirmOrderParams<'a> {
    /// Code of the draft order.
    pub code: &'a OrderCode,
    /// Resolved purchasing customer.
    pub customer_id: CustomerId,
    /// Resolved delivery address.
    pub address_id: AddressId,
    /// Delivery fee for the address region.
    pub shipping: Decimal,
    /// Final total (`subtotal + shipping`).
    pub total_price: Decimal,
    /// Customer note from the checkout form.
    pub user_note: Option<&'a str>,
}

/// Parameters for creating a direct (buy-now) order.
pub struct DirectOrderParams<'a> {
    /// Pre-generated order code.
    pub code: &'a OrderCode,
    /// The single synthesized cart line.
    pub line: &'a CartLine,
    /// Delivery fee for the address region.
    pub shipping: Decimal,
    /// Resolved purchasing customer.
    pub customer_id: CustomerId,
    /// Resolved delivery address.
    pub address_id: AddressId,
    /// Customer note from the checkout form.
    pub user_note: Option<&'a str>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by its code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_by_code(&self, code: &OrderCode) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE code = $1"))
            .bind(code)
            .fetch_optional(self.pool)
            .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Create a draft order with its lines in one transaction.
    ///
    /// The draft carries `total_price = subtotal` and zero shipping; the
    /// delivery fee is attached at completion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order code already exists
    /// (callers regenerate the code and retry).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_draft(
        &self,
        code: &OrderCode,
        lines: &[CartLine],
        subtotal: Decimal,
    ) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.orders
                (code, status, subtotal, shipping, total_price, payment_method)
            VALUES ($1, $2, $3, 0, $3, $4)
            RETURNING id
            ",
        )
        .bind(code)
        .bind(OrderStatus::Draft.as_str())
        .bind(subtotal)
        .bind(PaymentMethod::Cash.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("order code already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        for line in lines {
            sqlx::query(
                r"
                INSERT INTO storefront.order_lines (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(i64::from(line.quantity))
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order_id)
    }

    /// Confirm a draft order: attach customer, address and note, set the
    /// delivery fee and final total, and flip the status.
    ///
    /// The `status = 'draft'` guard makes a second confirmation of the same
    /// code fail with `NotFound` instead of silently overwriting.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no draft order has this code.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn confirm(&self, params: ConfirmOrderParams<'_>) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.orders
            SET status = $2,
                customer_id = $3,
                address_id = $4,
                shipping = $5,
                total_price = $6,
                user_note = $7,
                updated_at = now()
            WHERE code = $1 AND status = $8
            ",
        )
        .bind(params.code)
        .bind(OrderStatus::Confirmed.as_str())
        .bind(params.customer_id)
        .bind(params.address_id)
        .bind(params.shipping)
        .bind(params.total_price)
        .bind(params.user_note)
        .bind(OrderStatus::Draft.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Create a buy-now order directly in `confirmed` status, with its
    /// single line, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order code already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_confirmed(
        &self,
        params: DirectOrderParams<'_>,
    ) -> Result<OrderId, RepositoryError> {
        let subtotal = params.line.line_total();
        let total_price = subtotal + params.shipping;

        let mut tx = self.pool.begin().await?;

        let order_id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.orders
                (code, status, subtotal, shipping, total_price, payment_method,
                 customer_id, address_id, user_note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(params.code)
        .bind(OrderStatus::Confirmed.as_str())
        .bind(subtotal)
        .bind(params.shipping)
        .bind(total_price)
        .bind(PaymentMethod::Cash.as_str())
        .bind(params.customer_id)
        .bind(params.address_id)
        .bind(params.user_note)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("order code already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        sqlx::query(
            r"
            INSERT INTO storefront.order_lines (order_id, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(order_id)
        .bind(params.line.product_id)
        .bind(i64::from(params.line.quantity))
        .bind(params.line.unit_price)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(order_id)
    }

    /// Fetch the full order graph (lines + products + customer + address +
    /// region names) for confirmation emails.
    ///
    /// Returns `None` if the order does not exist or has no customer or
    /// address attached yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_confirmation(
        &self,
        code: &OrderCode,
    ) -> Result<Option<OrderConfirmation>, RepositoryError> {
        let Some(order) = self.get_by_code(code).await? else {
            return Ok(None);
        };

        let (Some(customer_id), Some(address_id)) = (order.customer_id, order.address_id) else {
            return Ok(None);
        };

        let lines = self.fetch_confirmation_lines(order.id).await?;
        let Some(customer) = self.fetch_customer(customer_id).await? else {
            return Ok(None);
        };
        let Some(address) = self.fetch_address(address_id).await? else {
            return Ok(None);
        };

        #[derive(sqlx::FromRow)]
        struct RegionNames {
            name_en: String,
            name_ar: String,
        }

        let names = sqlx::query_as::<_, RegionNames>(
            r"
            SELECT name_en, name_ar
            FROM storefront.regions
            WHERE code = $1
            ",
        )
        .bind(&address.region_code)
        .fetch_optional(self.pool)
        .await?;

        let (region_name_en, region_name_ar) = names
            .map_or_else(
                || (address.region_code.clone(), address.region_code.clone()),
                |n| (n.name_en, n.name_ar),
            );

        Ok(Some(OrderConfirmation {
            order,
            lines,
            customer,
            address,
            region_name_en,
            region_name_ar,
        }))
    }

    async fn fetch_confirmation_lines(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderConfirmationLine>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct LineRow {
            name_en: String,
            name_ar: String,
            sku: String,
            quantity: i64,
            unit_price: Decimal,
        }

        let rows = sqlx::query_as::<_, LineRow>(
            r"
            SELECT p.name_en, p.name_ar, p.sku, l.quantity, l.unit_price
            FROM storefront.order_lines l
            JOIN storefront.products p ON p.id = l.product_id
            WHERE l.order_id = $1
            ORDER BY l.id ASC
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for r in rows {
            let quantity = u32::try_from(r.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "invalid line quantity in database: {}",
                    r.quantity
                ))
            })?;

            lines.push(OrderConfirmationLine {
                name_en: r.name_en,
                name_ar: r.name_ar,
                sku: r.sku,
                quantity,
                unit_price: r.unit_price,
            });
        }

        Ok(lines)
    }

    async fn fetch_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, RepositoryError> {
        // `email` stays raw; re-parsing it is the corruption check.
        #[derive(sqlx::FromRow)]
        struct Row {
            id: CustomerId,
            user_id: UserId,
            full_name: String,
            phone: String,
            email: String,
            created_at: DateTime<Utc>,
        }

        let row = sqlx::query_as::<_, Row>(
            r"
            SELECT id, user_id, full_name, phone, email, created_at
            FROM storefront.customers
            WHERE id = $1
            ",
        )
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Some(Customer {
            id: r.id,
            user_id: r.user_id,
            full_name: r.full_name,
            phone: r.phone,
            email,
            created_at: r.created_at,
        }))
    }

    async fn fetch_address(
        &self,
        address_id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
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

        let row = sqlx::query_as::<_, Row>(
            r"
            SELECT id, customer_id, full_name, phone, address_line, region_code,
                   notes, is_default, created_at
            FROM storefront.addresses
            WHERE id = $1
            ",
        )
        .bind(address_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| Address {
            id: r.id,
            customer_id: r.customer_id,
            full_name: r.full_name,
            phone: r.phone,
            address_line: r.address_line,
            region_code: r.region_code,
            notes: r.notes,
            is_default: r.is_default,
            created_at: r.created_at,
        }))
    }
}
