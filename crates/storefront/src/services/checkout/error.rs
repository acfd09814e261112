//! Checkout error types.
//!
//! Every checkout failure maps to a stable string error code that the
//! client branches on; the `Display` text is the human-readable message
//! shown in the checkout banner.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during checkout workflows.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Form validation failed; the message joins all field errors.
    #[error("{0}")]
    Validation(String),

    /// Guest checkout without email and password.
    #[error("Email and password are required to complete checkout")]
    MissingCredentials,

    /// The email is registered but the password does not match.
    #[error("An account with this email already exists and the password does not match")]
    ExistingAccountPasswordMismatch,

    /// Sign-up failed for a reason other than an existing account.
    #[error("Could not create your account")]
    AccountCreationFailed,

    /// Creating the customer profile failed.
    #[error("Could not create your customer record")]
    UserRecordCreateFailed,

    /// Fetching the customer profile failed.
    #[error("Could not load your customer record")]
    UserRecordFetchFailed,

    /// No customer profile exists for the authenticated user.
    #[error("No customer record found for this account")]
    UserRecordNotFound,

    /// Creating or resolving the delivery address failed.
    #[error("Could not save the delivery address")]
    AddressCreateFailed,

    /// The delivery region or its fee could not be resolved.
    #[error("Could not determine the delivery fee for this region")]
    StateFeeFetchFailed,

    /// The draft order does not exist or is no longer a draft.
    #[error("Order not found")]
    OrderFetchFailed,

    /// Confirming the order failed.
    #[error("Could not update the order")]
    OrderUpdateFailed,

    /// Catch-all for anything not anticipated.
    #[error("Checkout failed unexpectedly")]
    Unhandled(#[source] RepositoryError),
}

impl CheckoutError {
    /// Stable error code surfaced to the client.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyCart => "EMPTY_CART",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::ExistingAccountPasswordMismatch => "EXISTING_ACCOUNT_PASSWORD_MISMATCH",
            Self::AccountCreationFailed => "ACCOUNT_CREATION_FAILED",
            Self::UserRecordCreateFailed => "USER_RECORD_CREATE_FAILED",
            Self::UserRecordFetchFailed => "USER_RECORD_FETCH_FAILED",
            Self::UserRecordNotFound => "USER_RECORD_NOT_FOUND",
            Self::AddressCreateFailed => "ADDRESS_CREATE_FAILED",
            Self::StateFeeFetchFailed => "STATE_FEE_FETCH_FAILED",
            Self::OrderFetchFailed => "ORDER_FETCH_FAILED",
            Self::OrderUpdateFailed => "ORDER_UPDATE_FAILED",
            Self::Unhandled(_) => "UNHANDLED_CHECKOUT_ERROR",
        }
    }
}

impl From<RepositoryError> for CheckoutError {
    fn from(e: RepositoryError) -> Self {
        Self::Unhandled(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cart_message_and_code() {
        let err = CheckoutError::EmptyCart;
        assert_eq!(err.to_string(), "Cart is empty");
        assert_eq!(err.code(), "EMPTY_CART");
    }

    #[test]
    fn test_validation_error_carries_joined_messages() {
        let err = CheckoutError::Validation("full name is required; phone is required".to_owned());
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("phone is required"));
    }

    #[test]
    fn test_repository_errors_fall_back_to_unhandled() {
        let err: CheckoutError = RepositoryError::NotFound.into();
        assert_eq!(err.code(), "UNHANDLED_CHECKOUT_ERROR");
    }
}
