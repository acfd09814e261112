//! Session state types and keys.

use serde::{Deserialize, Serialize};

use sidra_core::{Email, UserId};

/// Session keys used across the storefront.
pub mod session_keys {
    /// The authenticated user, if any.
    pub const CURRENT_USER: &str = "current_user";
}

/// The authenticated user stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Authentication identity ID.
    pub user_id: UserId,
    /// Login email.
    pub email: Email,
}
