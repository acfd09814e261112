//! Integration tests for Sidra Market.
//!
//! The crate has no library code; everything lives under `tests/`.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database, then:
//! DATABASE_URL=postgres://localhost/sidra cargo test -p sidra-integration-tests
//! ```
//!
//! Each test is annotated with `#[sqlx::test]`, which provisions an
//! ephemeral database and applies the storefront migrations, so tests
//! never touch each other's rows.
