//! HTTP route handlers for the storefront checkout API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (DB ping)
//!
//! # Checkout
//! POST /api/checkout/draft                  - Create a draft order from cart lines
//! POST /api/checkout/guest                  - Complete a draft (guest credentials)
//! POST /api/checkout/authenticated          - Complete a draft (session user)
//! POST /api/checkout/buy-now/guest          - Buy-now checkout (guest credentials)
//! POST /api/checkout/buy-now/authenticated  - Buy-now checkout (session user)
//! ```

pub mod checkout;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Create the checkout API router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/draft", post(checkout::create_draft))
        .route("/guest", post(checkout::guest_checkout))
        .route("/authenticated", post(checkout::authenticated_checkout))
        .route("/buy-now/guest", post(checkout::guest_buy_now))
        .route(
            "/buy-now/authenticated",
            post(checkout::authenticated_buy_now),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api/checkout", checkout_routes())
}
