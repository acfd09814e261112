//! Checkout API routes.
//!
//! JSON endpoints wrapping the checkout workflows. Every response uses the
//! `{success, orderCode}` / `{success:false, error, errorCode}` envelope
//! with a non-2xx status on failure.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use sidra_core::OrderId;

use crate::error::set_sentry_user;
use crate::middleware::{RequireUser, set_current_user};
use crate::models::CartLine;
use crate::services::checkout::{CheckoutError, CheckoutForm, CheckoutOutcome, DirectCheckoutForm};
use crate::state::AppState;

/// Failure envelope shared by every checkout endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFailure {
    pub success: bool,
    pub error: String,
    pub error_code: &'static str,
}

impl CheckoutFailure {
    fn from_error(error: &CheckoutError) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            error_code: error.code(),
        }
    }
}

/// Map a checkout error onto its HTTP status and failure envelope.
fn failure_response(error: &CheckoutError) -> Response {
    if matches!(error, CheckoutError::Unhandled(_)) {
        let event_id = sentry::capture_error(error);
        tracing::error!(error = %error, sentry_event_id = %event_id, "Unhandled checkout error");
    }

    let status = match error {
        CheckoutError::EmptyCart
        | CheckoutError::Validation(_)
        | CheckoutError::MissingCredentials => StatusCode::BAD_REQUEST,
        CheckoutError::ExistingAccountPasswordMismatch => StatusCode::UNAUTHORIZED,
        CheckoutError::UserRecordNotFound | CheckoutError::OrderFetchFailed => {
            StatusCode::NOT_FOUND
        }
        CheckoutError::AccountCreationFailed
        | CheckoutError::UserRecordCreateFailed
        | CheckoutError::UserRecordFetchFailed
        | CheckoutError::AddressCreateFailed
        | CheckoutError::StateFeeFetchFailed
        | CheckoutError::OrderUpdateFailed
        | CheckoutError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(CheckoutFailure::from_error(error))).into_response()
}

// ============================================================================
// Draft creation
// ============================================================================

/// Request to create a draft order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    /// Cart lines; an empty or absent list fails with `EMPTY_CART`.
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

/// Response from creating a draft order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub success: bool,
    pub order_code: String,
    pub order_id: OrderId,
    pub subtotal: Decimal,
}

/// Create a draft order from cart lines.
///
/// POST /api/checkout/draft
pub async fn create_draft(
    State(state): State<AppState>,
    Json(req): Json<DraftRequest>,
) -> Response {
    match state.checkout().create_draft_order(&req.lines).await {
        Ok(draft) => Json(DraftResponse {
            success: true,
            order_code: draft.order_code.to_string(),
            order_id: draft.order_id,
            subtotal: draft.subtotal,
        })
        .into_response(),
        Err(e) => failure_response(&e),
    }
}

// ============================================================================
// Draft completion
// ============================================================================

/// Request to complete a draft order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    /// Code of the draft order to complete.
    pub order_code: String,
    /// Customer and delivery details.
    #[serde(flatten)]
    pub form: CheckoutForm,
}

/// Success envelope for completion and buy-now endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub success: bool,
    pub order_code: String,
}

/// Turn a successful checkout into a response, signing the guest account
/// into the session when one was resolved.
async fn success_response(session: &Session, outcome: CheckoutOutcome) -> Response {
    if let Some(user) = &outcome.guest_user {
        if let Err(e) = set_current_user(session, user).await {
            tracing::warn!(error = %e, "Could not persist guest sign-in");
        }
        set_sentry_user(&user.user_id, Some(user.email.as_str()));
    }

    Json(CompleteResponse {
        success: true,
        order_code: outcome.order_code.to_string(),
    })
    .into_response()
}

/// Complete a draft order as a guest.
///
/// POST /api/checkout/guest
pub async fn guest_checkout(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CompleteRequest>,
) -> Response {
    match state
        .checkout()
        .complete_checkout(&req.order_code, &req.form, None)
        .await
    {
        Ok(outcome) => success_response(&session, outcome).await,
        Err(e) => failure_response(&e),
    }
}

/// Complete a draft order as the signed-in user.
///
/// POST /api/checkout/authenticated
pub async fn authenticated_checkout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    session: Session,
    Json(req): Json<CompleteRequest>,
) -> Response {
    set_sentry_user(&user.user_id, Some(user.email.as_str()));

    match state
        .checkout()
        .complete_checkout(&req.order_code, &req.form, Some(user.user_id))
        .await
    {
        Ok(outcome) => success_response(&session, outcome).await,
        Err(e) => failure_response(&e),
    }
}

// ============================================================================
// Buy-now
// ============================================================================

/// Buy-now checkout as a guest.
///
/// POST /api/checkout/buy-now/guest
pub async fn guest_buy_now(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<DirectCheckoutForm>,
) -> Response {
    match state.checkout().direct_checkout(&req, None).await {
        Ok(outcome) => success_response(&session, outcome).await,
        Err(e) => failure_response(&e),
    }
}

/// Buy-now checkout as the signed-in user.
///
/// POST /api/checkout/buy-now/authenticated
pub async fn authenticated_buy_now(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    session: Session,
    Json(req): Json<DirectCheckoutForm>,
) -> Response {
    set_sentry_user(&user.user_id, Some(user.email.as_str()));

    match state.checkout().direct_checkout(&req, Some(user.user_id)).await {
        Ok(outcome) => success_response(&session, outcome).await,
        Err(e) => failure_response(&e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_shape() {
        let failure = CheckoutFailure::from_error(&CheckoutError::EmptyCart);
        let json = serde_json::to_value(&failure).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Cart is empty");
        assert_eq!(json["errorCode"], "EMPTY_CART");
    }

    #[test]
    fn test_failure_statuses() {
        fn status_of(error: &CheckoutError) -> StatusCode {
            failure_response(error).status()
        }

        assert_eq!(status_of(&CheckoutError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(&CheckoutError::Validation("phone is required".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&CheckoutError::ExistingAccountPasswordMismatch),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(&CheckoutError::OrderFetchFailed),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(&CheckoutError::OrderUpdateFailed),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_complete_request_parses_flattened_form() {
        let req: CompleteRequest = serde_json::from_str(
            r#"{
                "orderCode": "ORD260826K3XP9",
                "email": "guest@example.com",
                "password": "secret-password",
                "fullName": "Maryam Al Ali",
                "phone": "+971501234567",
                "address": "Villa 12, Al Wasl Road",
                "stateCode": "DXB"
            }"#,
        )
        .unwrap();

        assert_eq!(req.order_code, "ORD260826K3XP9");
        assert_eq!(req.form.state_code, "DXB");
        assert_eq!(req.form.email.as_deref(), Some("guest@example.com"));
    }
}
