//! Identity service.
//!
//! Email/password sign-up and sign-in, plus the guest checkout flow that
//! reuses an existing account when the email is already registered.

mod error;

pub use error::IdentityError;

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use sidra_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Sign-in retries after a sign-up timeout.
const TIMEOUT_RETRY_ATTEMPTS: u32 = 3;

/// Delay between those retries.
const TIMEOUT_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Identity service.
///
/// Handles account creation and credential checks for checkout.
pub struct IdentityService<'a> {
    users: UserRepository<'a>,
}

impl<'a> IdentityService<'a> {
    /// Create a new identity service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account with email and password.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidEmail` if the email format is invalid.
    /// Returns `IdentityError::WeakPassword` if the password is too short.
    /// Returns `IdentityError::AccountExists` if the email is already registered.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => IdentityError::AccountExists,
                other => other.into(),
            })?;

        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidCredentials` if the email/password is wrong.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Resolve an account for guest checkout.
    ///
    /// Creates a new account for the email, or signs into the existing one
    /// when the email is already registered. A sign-up timeout may mean the
    /// account was created anyway, so it falls back to a few delayed sign-in
    /// attempts before giving up.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidCredentials` if the email is registered
    /// but the password does not match. Other variants bubble up from
    /// [`Self::sign_up`] and [`Self::sign_in`].
    pub async fn sign_up_or_sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, IdentityError> {
        match self.sign_up(email, password).await {
            Ok(user) => Ok(user),
            Err(IdentityError::AccountExists) => self.sign_in(email, password).await,
            Err(IdentityError::Timeout) => {
                tracing::warn!(email, "Sign-up timed out, retrying via sign-in");

                let mut last = IdentityError::Timeout;
                for attempt in 1..=TIMEOUT_RETRY_ATTEMPTS {
                    tokio::time::sleep(TIMEOUT_RETRY_DELAY).await;
                    match self.sign_in(email, password).await {
                        Ok(user) => return Ok(user),
                        Err(e) => {
                            tracing::debug!(attempt, error = %e, "Recovery sign-in failed");
                            last = e;
                        }
                    }
                }
                Err(last)
            }
            Err(other) => Err(other),
        }
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), IdentityError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(IdentityError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| IdentityError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), IdentityError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| IdentityError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| IdentityError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_is_rejected() {
        let err = validate_password("short").unwrap_err();
        assert!(matches!(err, IdentityError::WeakPassword(_)));
    }

    #[test]
    fn test_minimum_length_password_is_accepted() {
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password!", &hash),
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_maps_to_invalid_credentials() {
        assert!(matches!(
            verify_password("anything1", "not-a-phc-string"),
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_transient_repository_error_becomes_timeout() {
        let err: IdentityError = RepositoryError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, IdentityError::Timeout));
    }

    #[test]
    fn test_not_found_repository_error_is_not_a_timeout() {
        let err: IdentityError = RepositoryError::NotFound.into();
        assert!(matches!(err, IdentityError::Repository(_)));
    }
}
