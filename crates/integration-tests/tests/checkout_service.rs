//! Database-backed tests for the checkout workflows.
//!
//! These exercise `CheckoutService` end to end against a real Postgres
//! database: draft creation, guest completion, buy-now, and the failure
//! paths that must not leave partial rows behind. SMTP is deliberately
//! left unconfigured so the tests also pin down that missing email
//! delivery never fails a checkout.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sqlx::PgPool;

use sidra_core::ProductId;
use sidra_storefront::models::CartLine;
use sidra_storefront::services::audit::AuditLog;
use sidra_storefront::services::checkout::{CheckoutForm, CheckoutService, DirectCheckoutForm};
use sidra_storefront::services::email::EmailService;

// ============================================================================
// Helpers
// ============================================================================

/// Email service without SMTP configuration; sending is skipped.
fn unconfigured_email() -> EmailService {
    let email = EmailService::new(None).expect("email service without SMTP config");
    assert!(!email.is_configured());
    email
}

async fn seed_region(pool: &PgPool, code: &str, fee: Decimal) {
    sqlx::query(
        "INSERT INTO storefront.regions (code, name_en, name_ar, delivery_fee)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(code)
    .bind("Dubai")
    .bind("دبي")
    .bind(fee)
    .execute(pool)
    .await
    .expect("seed region");
}

async fn seed_product(pool: &PgPool, sku: &str, price: Decimal) -> ProductId {
    sqlx::query_scalar(
        "INSERT INTO storefront.products (sku, name_en, name_ar, price)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(sku)
    .bind("Sidr Honey 500g")
    .bind("عسل السدر ٥٠٠ جرام")
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("seed product")
}

fn guest_form() -> CheckoutForm {
    CheckoutForm {
        email: Some("guest@example.com".to_owned()),
        password: Some("guest-password".to_owned()),
        confirm_password: Some("guest-password".to_owned()),
        full_name: "Maryam Al Ali".to_owned(),
        phone: "+971501234567".to_owned(),
        address: "Villa 12, Al Wasl Road".to_owned(),
        state_code: "DXB".to_owned(),
        notes: None,
        selected_address_id: None,
        use_new_address: false,
    }
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM storefront.{table}"))
        .fetch_one(pool)
        .await
        .expect("count rows")
}

// ============================================================================
// Draft Creation
// ============================================================================

#[sqlx::test(migrations = "../storefront/migrations")]
async fn test_empty_cart_writes_no_order_rows(pool: PgPool) {
    let email = unconfigured_email();
    let audit = AuditLog::disabled();
    let checkout = CheckoutService::new(&pool, &email, &audit);

    let err = checkout.create_draft_order(&[]).await.unwrap_err();
    assert_eq!(err.code(), "EMPTY_CART");
    assert_eq!(err.to_string(), "Cart is empty");

    assert_eq!(count(&pool, "orders").await, 0);
    assert_eq!(count(&pool, "order_lines").await, 0);
}

// ============================================================================
// Guest Completion
// ============================================================================

#[sqlx::test(migrations = "../storefront/migrations")]
async fn test_guest_checkout_confirms_draft_and_adds_delivery_fee(pool: PgPool) {
    seed_region(&pool, "DXB", Decimal::new(20, 0)).await;
    let product_id = seed_product(&pool, "HNY-500", Decimal::new(65, 0)).await;

    let email = unconfigured_email();
    let audit = AuditLog::disabled();
    let checkout = CheckoutService::new(&pool, &email, &audit);

    let draft = checkout
        .create_draft_order(&[CartLine {
            product_id,
            quantity: 2,
            unit_price: Decimal::new(65, 0),
        }])
        .await
        .unwrap();
    assert_eq!(draft.subtotal, Decimal::new(130, 0));

    // Completes despite SMTP being unconfigured.
    let outcome = checkout
        .complete_checkout(draft.order_code.as_str(), &guest_form(), None)
        .await
        .unwrap();
    assert_eq!(outcome.order_code, draft.order_code);
    assert!(outcome.guest_user.is_some(), "guest account should be resolved");

    let (status, total_price): (String, Decimal) =
        sqlx::query_as("SELECT status, total_price FROM storefront.orders WHERE code = $1")
            .bind(draft.order_code.as_str())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "confirmed");
    assert_eq!(total_price, Decimal::new(150, 0));
}

#[sqlx::test(migrations = "../storefront/migrations")]
async fn test_confirmed_order_cannot_be_completed_twice(pool: PgPool) {
    seed_region(&pool, "DXB", Decimal::new(20, 0)).await;
    let product_id = seed_product(&pool, "HNY-500", Decimal::new(65, 0)).await;

    let email = unconfigured_email();
    let audit = AuditLog::disabled();
    let checkout = CheckoutService::new(&pool, &email, &audit);

    let draft = checkout
        .create_draft_order(&[CartLine {
            product_id,
            quantity: 1,
            unit_price: Decimal::new(65, 0),
        }])
        .await
        .unwrap();

    checkout
        .complete_checkout(draft.order_code.as_str(), &guest_form(), None)
        .await
        .unwrap();

    // The order is no longer a draft; a replayed completion is rejected.
    let err = checkout
        .complete_checkout(draft.order_code.as_str(), &guest_form(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ORDER_FETCH_FAILED");

    assert_eq!(count(&pool, "orders").await, 1);
}

#[sqlx::test(migrations = "../storefront/migrations")]
async fn test_unknown_region_fails_fee_lookup_before_address_insert(pool: PgPool) {
    seed_region(&pool, "DXB", Decimal::new(20, 0)).await;
    let product_id = seed_product(&pool, "HNY-500", Decimal::new(65, 0)).await;

    let email = unconfigured_email();
    let audit = AuditLog::disabled();
    let checkout = CheckoutService::new(&pool, &email, &audit);

    let draft = checkout
        .create_draft_order(&[CartLine {
            product_id,
            quantity: 1,
            unit_price: Decimal::new(65, 0),
        }])
        .await
        .unwrap();

    let form = CheckoutForm {
        state_code: "XYZ".to_owned(),
        ..guest_form()
    };
    let err = checkout
        .complete_checkout(draft.order_code.as_str(), &form, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "STATE_FEE_FETCH_FAILED");

    // No address row is written for a region we cannot deliver to.
    assert_eq!(count(&pool, "addresses").await, 0);

    let status: String = sqlx::query_scalar("SELECT status FROM storefront.orders WHERE code = $1")
        .bind(draft.order_code.as_str())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "draft");
}

// ============================================================================
// Buy-Now
// ============================================================================

#[sqlx::test(migrations = "../storefront/migrations")]
async fn test_buy_now_creates_confirmed_order_with_server_side_price(pool: PgPool) {
    seed_region(&pool, "DXB", Decimal::new(20, 0)).await;
    let product_id = seed_product(&pool, "HNY-500", Decimal::new(65, 0)).await;

    let email = unconfigured_email();
    let audit = AuditLog::disabled();
    let checkout = CheckoutService::new(&pool, &email, &audit);

    let request = DirectCheckoutForm {
        product_id,
        quantity: 2,
        form: guest_form(),
    };
    let outcome = checkout.direct_checkout(&request, None).await.unwrap();

    let (status, subtotal, total_price): (String, Decimal, Decimal) = sqlx::query_as(
        "SELECT status, subtotal, total_price FROM storefront.orders WHERE code = $1",
    )
    .bind(outcome.order_code.as_str())
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(status, "confirmed");
    assert_eq!(subtotal, Decimal::new(130, 0));
    assert_eq!(total_price, Decimal::new(150, 0));
    assert_eq!(count(&pool, "order_lines").await, 1);
}
