//! Checkout workflows.
//!
//! Three entry points, all returning a result the HTTP layer maps onto
//! the `{success, orderCode | error, errorCode}` envelope:
//!
//! - [`CheckoutService::create_draft_order`] persists a cart as a draft
//!   order with one line per cart entry.
//! - [`CheckoutService::complete_checkout`] resolves identity, address
//!   and delivery fee for an existing draft and confirms it.
//! - [`CheckoutService::direct_checkout`] does the same for a single
//!   buy-now line, creating the order directly in confirmed status.
//!
//! Notification emails and audit writes are best-effort: their failures
//! are logged and never turn a completed checkout into an error.

mod error;
mod forms;

pub use error::CheckoutError;
pub use forms::{CheckoutForm, DirectCheckoutForm};

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

use sidra_core::{AddressId, OrderCode, OrderId, UserId};

use crate::db::RepositoryError;
use crate::db::addresses::{AddressRepository, NewAddress};
use crate::db::orders::{ConfirmOrderParams, DirectOrderParams, OrderRepository};
use crate::db::products::ProductRepository;
use crate::db::regions::RegionRepository;
use crate::db::users::UserRepository;
use crate::models::{CartLine, CurrentUser, Customer, cart};
use crate::services::audit::AuditLog;
use crate::services::email::EmailService;
use crate::services::identity::{IdentityError, IdentityService};

/// Attempts at generating a unique order code before giving up.
const CODE_ATTEMPTS: u32 = 3;

/// A freshly created draft order.
#[derive(Debug, Clone)]
pub struct DraftOrder {
    /// Database ID of the draft.
    pub order_id: OrderId,
    /// Human-readable order code.
    pub order_code: OrderCode,
    /// Sum of line totals.
    pub subtotal: Decimal,
}

/// A completed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// Code of the confirmed order.
    pub order_code: OrderCode,
    /// Account resolved on the guest path; the HTTP layer signs it into
    /// the session. `None` for authenticated checkouts.
    pub guest_user: Option<CurrentUser>,
}

/// Checkout orchestration service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    email: &'a EmailService,
    audit: &'a AuditLog,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService, audit: &'a AuditLog) -> Self {
        Self { pool, email, audit }
    }

    /// Persist a cart as a draft order.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart and
    /// `CheckoutError::Validation` for zero-quantity lines.
    pub async fn create_draft_order(&self, lines: &[CartLine]) -> Result<DraftOrder, CheckoutError> {
        if lines.is_empty() {
            self.audit
                .error("checkout", "draft rejected: empty cart", None, json!({}));
            return Err(CheckoutError::EmptyCart);
        }
        if lines.iter().any(|l| l.quantity == 0) {
            return Err(CheckoutError::Validation(
                "cart line quantity must be at least 1".to_owned(),
            ));
        }

        let subtotal = cart::subtotal(lines);
        let orders = OrderRepository::new(self.pool);

        let mut attempt = 0;
        let (order_id, order_code) = loop {
            attempt += 1;
            let code = OrderCode::generate();
            match orders.create_draft(&code, lines, subtotal).await {
                Ok(id) => break (id, code),
                Err(RepositoryError::Conflict(_)) if attempt < CODE_ATTEMPTS => {
                    tracing::warn!(code = %code, attempt, "Order code collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        };

        self.audit.info(
            "checkout",
            "draft order created",
            None,
            json!({
                "orderCode": order_code.as_str(),
                "lines": lines.len(),
                "subtotal": subtotal.to_string(),
            }),
        );

        Ok(DraftOrder {
            order_id,
            order_code,
            subtotal,
        })
    }

    /// Complete checkout for an existing draft order.
    ///
    /// `session_user` carries the authenticated user, if any; without it
    /// the form must supply guest credentials.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` whose code identifies the failing step.
    pub async fn complete_checkout(
        &self,
        order_code: &str,
        form: &CheckoutForm,
        session_user: Option<UserId>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        self.audit.info(
            "checkout",
            "checkout started",
            session_user,
            json!({"orderCode": order_code}),
        );

        if let Err(messages) = form.validate() {
            return self.fail(
                session_user,
                order_code,
                CheckoutError::Validation(messages.join("; ")),
            );
        }

        let code = match OrderCode::parse(order_code) {
            Ok(code) => code,
            Err(_) => return self.fail(session_user, order_code, CheckoutError::OrderFetchFailed),
        };

        let orders = OrderRepository::new(self.pool);
        let order = match orders.get_by_code(&code).await {
            Ok(Some(order)) if order.status.is_draft() => order,
            Ok(_) => return self.fail(session_user, order_code, CheckoutError::OrderFetchFailed),
            Err(_) => return self.fail(session_user, order_code, CheckoutError::OrderFetchFailed),
        };

        let (customer, guest_user) = match self.resolve_customer(form, session_user).await {
            Ok(resolved) => resolved,
            Err(e) => return self.fail(session_user, order_code, e),
        };

        let (address, delivery_fee) = match self.resolve_address(&customer, form).await {
            Ok(resolved) => resolved,
            Err(e) => return self.fail(session_user, order_code, e),
        };

        let result = orders
            .confirm(ConfirmOrderParams {
                code: &code,
                customer_id: customer.id,
                address_id: address.id,
                shipping: delivery_fee,
                total_price: order.total_price + delivery_fee,
                user_note: form.notes.as_deref(),
            })
            .await;
        if result.is_err() {
            return self.fail(session_user, order_code, CheckoutError::OrderUpdateFailed);
        }

        self.send_order_emails(&code, session_user).await;

        self.audit.info(
            "checkout",
            "checkout completed",
            session_user,
            json!({"orderCode": code.as_str()}),
        );

        Ok(CheckoutOutcome {
            order_code: code,
            guest_user,
        })
    }

    /// Buy-now checkout: one synthesized line, order created directly in
    /// confirmed status.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` whose code identifies the failing step.
    pub async fn direct_checkout(
        &self,
        request: &DirectCheckoutForm,
        session_user: Option<UserId>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        self.audit.info(
            "checkout",
            "buy-now checkout started",
            session_user,
            json!({"productId": request.product_id, "quantity": request.quantity}),
        );

        if let Err(messages) = request.validate() {
            return self.fail(
                session_user,
                "-",
                CheckoutError::Validation(messages.join("; ")),
            );
        }

        // Snapshot the price server-side; the client never submits one.
        let products = ProductRepository::new(self.pool);
        let product = match products.get_by_id(request.product_id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                return self.fail(
                    session_user,
                    "-",
                    CheckoutError::Validation("unknown product".to_owned()),
                );
            }
            Err(e) => return self.fail(session_user, "-", e.into()),
        };

        let line = CartLine {
            product_id: product.id,
            quantity: request.quantity,
            unit_price: product.price,
        };

        let (customer, guest_user) = match self.resolve_customer(&request.form, session_user).await
        {
            Ok(resolved) => resolved,
            Err(e) => return self.fail(session_user, "-", e),
        };

        let (address, delivery_fee) = match self.resolve_address(&customer, &request.form).await {
            Ok(resolved) => resolved,
            Err(e) => return self.fail(session_user, "-", e),
        };

        let orders = OrderRepository::new(self.pool);
        let mut attempt = 0;
        let code = loop {
            attempt += 1;
            let code = OrderCode::generate();
            let result = orders
                .create_confirmed(DirectOrderParams {
                    code: &code,
                    line: &line,
                    shipping: delivery_fee,
                    customer_id: customer.id,
                    address_id: address.id,
                    user_note: request.form.notes.as_deref(),
                })
                .await;
            match result {
                Ok(_) => break code,
                Err(RepositoryError::Conflict(_)) if attempt < CODE_ATTEMPTS => {
                    tracing::warn!(code = %code, attempt, "Order code collision, regenerating");
                }
                Err(_) => {
                    return self.fail(session_user, "-", CheckoutError::OrderUpdateFailed);
                }
            }
        };

        self.send_order_emails(&code, session_user).await;

        self.audit.info(
            "checkout",
            "buy-now checkout completed",
            session_user,
            json!({"orderCode": code.as_str()}),
        );

        Ok(CheckoutOutcome {
            order_code: code,
            guest_user,
        })
    }

    /// Resolve the purchasing customer.
    ///
    /// Authenticated sessions must already have a customer profile; the
    /// guest path signs up (or signs into) an account and creates the
    /// profile when it is missing.
    async fn resolve_customer(
        &self,
        form: &CheckoutForm,
        session_user: Option<UserId>,
    ) -> Result<(Customer, Option<CurrentUser>), CheckoutError> {
        let users = UserRepository::new(self.pool);

        if let Some(user_id) = session_user {
            let customer = users
                .get_customer_by_user(user_id)
                .await
                .map_err(|_| CheckoutError::UserRecordFetchFailed)?
                .ok_or(CheckoutError::UserRecordNotFound)?;
            return Ok((customer, None));
        }

        let Some((email, password)) = form.credentials() else {
            return Err(CheckoutError::MissingCredentials);
        };

        let identity = IdentityService::new(self.pool);
        let user = identity
            .sign_up_or_sign_in(email, password)
            .await
            .map_err(|e| match e {
                IdentityError::InvalidCredentials => CheckoutError::ExistingAccountPasswordMismatch,
                _ => CheckoutError::AccountCreationFailed,
            })?;

        let signed_in = CurrentUser {
            user_id: user.id,
            email: user.email.clone(),
        };

        let existing = users
            .get_customer_by_user(user.id)
            .await
            .map_err(|_| CheckoutError::UserRecordFetchFailed)?;
        if let Some(customer) = existing {
            return Ok((customer, Some(signed_in)));
        }

        let customer = match users
            .create_customer(user.id, form.full_name.trim(), form.phone.trim(), &user.email)
            .await
        {
            Ok(customer) => customer,
            // Lost a race with a concurrent checkout for the same account.
            Err(RepositoryError::Conflict(_)) => users
                .get_customer_by_user(user.id)
                .await
                .map_err(|_| CheckoutError::UserRecordFetchFailed)?
                .ok_or(CheckoutError::UserRecordNotFound)?,
            Err(_) => return Err(CheckoutError::UserRecordCreateFailed),
        };

        Ok((customer, Some(signed_in)))
    }

    /// Resolve the delivery address and its region fee: reuse a selected
    /// address only when it belongs to the customer, otherwise create one
    /// from the form fields.
    ///
    /// The fee is resolved before a new address row is written, so an
    /// unknown region reports as a fee lookup failure rather than tripping
    /// the region foreign key at insert time.
    async fn resolve_address(
        &self,
        customer: &Customer,
        form: &CheckoutForm,
    ) -> Result<(crate::models::Address, Decimal), CheckoutError> {
        let addresses = AddressRepository::new(self.pool);

        if let Some(selected) = form.selected_address_id
            && form.reuses_address()
        {
            let address = addresses
                .get_owned(AddressId::new(selected), customer.id)
                .await
                .map_err(|_| CheckoutError::AddressCreateFailed)?
                .ok_or(CheckoutError::AddressCreateFailed)?;
            let fee = self.delivery_fee(&address.region_code).await?;
            return Ok((address, fee));
        }

        let fee = self.delivery_fee(form.state_code.trim()).await?;

        let address = addresses
            .create(
                customer.id,
                NewAddress {
                    full_name: form.full_name.trim(),
                    phone: form.phone.trim(),
                    address_line: form.address.trim(),
                    region_code: form.state_code.trim(),
                    notes: form.notes.as_deref(),
                },
            )
            .await
            .map_err(|_| CheckoutError::AddressCreateFailed)?;

        Ok((address, fee))
    }

    /// Look up the delivery fee for a region code.
    async fn delivery_fee(&self, region_code: &str) -> Result<Decimal, CheckoutError> {
        let regions = RegionRepository::new(self.pool);
        let region = regions
            .get_by_code(region_code)
            .await
            .map_err(|_| CheckoutError::StateFeeFetchFailed)?
            .ok_or(CheckoutError::StateFeeFetchFailed)?;

        Ok(region.delivery_fee)
    }

    /// Send confirmation and admin emails for a confirmed order. Failures
    /// are logged and audited, never surfaced.
    async fn send_order_emails(&self, code: &OrderCode, session_user: Option<UserId>) {
        let orders = OrderRepository::new(self.pool);

        let confirmation = match orders.get_confirmation(code).await {
            Ok(Some(confirmation)) => confirmation,
            Ok(None) => {
                tracing::warn!(code = %code, "Confirmed order graph incomplete, skipping emails");
                return;
            }
            Err(e) => {
                tracing::warn!(code = %code, error = %e, "Could not load order for emails");
                return;
            }
        };

        if let Err(e) = self.email.send_order_emails(&confirmation).await {
            tracing::warn!(code = %code, error = %e, "Order emails failed");
            self.audit.error(
                "email",
                format!("order emails failed: {e}"),
                session_user,
                json!({"orderCode": code.as_str()}),
            );
        }
    }

    /// Audit a failed checkout and pass the error through.
    fn fail<T>(
        &self,
        session_user: Option<UserId>,
        order_code: &str,
        error: CheckoutError,
    ) -> Result<T, CheckoutError> {
        self.audit.error(
            "checkout",
            format!("checkout failed: {error}"),
            session_user,
            json!({"orderCode": order_code, "errorCode": error.code()}),
        );
        Err(error)
    }
}
