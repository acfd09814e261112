//! Application services.
//!
//! - [`audit`] - Non-blocking audit trail sink
//! - [`checkout`] - Draft, completion and buy-now checkout workflows
//! - [`email`] - Order confirmation and admin notification emails
//! - [`identity`] - Sign-up / sign-in with typed error kinds

pub mod audit;
pub mod checkout;
pub mod email;
pub mod identity;

pub use audit::AuditLog;
pub use checkout::CheckoutService;
pub use email::EmailService;
pub use identity::IdentityService;
