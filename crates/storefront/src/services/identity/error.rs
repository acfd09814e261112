//! Identity error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during sign-up and sign-in.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] sidra_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("account already exists")]
    AccountExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The identity backend did not respond in time.
    #[error("identity backend timed out")]
    Timeout,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<RepositoryError> for IdentityError {
    fn from(e: RepositoryError) -> Self {
        if e.is_transient() {
            Self::Timeout
        } else {
            Self::Repository(e)
        }
    }
}
