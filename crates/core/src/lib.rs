//! Sidra Core - Shared types library.
//!
//! This crate provides common types used across all Sidra Market components:
//! - `storefront` - Checkout and order service behind the public site
//! - `cli` - Command-line tools for migrations and reference-data seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, order codes and
//!   statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
