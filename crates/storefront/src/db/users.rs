//! User and customer repository.
//!
//! Covers both the authentication identity tables (`users`,
//! `user_passwords`) and the paired profile table (`customers`).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sidra_core::{CustomerId, Email, UserId};

use super::RepositoryError;
use crate::models::{Customer, User};

// Emails stay raw in the row types; re-parsing them on the way out is
// the corruption check.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: self.id,
            email,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    user_id: UserId,
    full_name: String,
    phone: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_customer(self) -> Result<Customer, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Customer {
            id: self.id,
            user_id: self.user_id,
            full_name: self.full_name,
            phone: self.phone,
            email,
            created_at: self.created_at,
        })
    }
}

/// Repository for user and customer database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with email and password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO storefront.users (email)
            VALUES ($1)
            RETURNING id, email, created_at
            ",
        )
        .bind(email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let user = row.into_user()?;

        sqlx::query(
            r"
            INSERT INTO storefront.user_passwords (user_id, password_hash)
            VALUES ($1, $2)
            ",
        )
        .bind(user.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user's password hash by email.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: UserId,
            email: String,
            created_at: DateTime<Utc>,
            password_hash: Option<String>,
        }

        let row = sqlx::query_as::<_, Row>(
            r"
            SELECT u.id, u.email, u.created_at, p.password_hash
            FROM storefront.users u
            LEFT JOIN storefront.user_passwords p ON u.id = p.user_id
            WHERE u.email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let Some(password_hash) = r.password_hash else {
            return Ok(None);
        };

        let user = UserRow {
            id: r.id,
            email: r.email,
            created_at: r.created_at,
        }
        .into_user()?;

        Ok(Some((user, password_hash)))
    }

    /// Get the customer profile paired with a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_customer_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, user_id, full_name, phone, email, created_at
            FROM storefront.customers
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(CustomerRow::into_customer).transpose()
    }

    /// Create a customer profile for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a profile.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_customer(
        &self,
        user_id: UserId,
        full_name: &str,
        phone: &str,
        email: &Email,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO storefront.customers (user_id, full_name, phone, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, full_name, phone, email, created_at
            ",
        )
        .bind(user_id)
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("customer profile already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_customer()
    }
}
