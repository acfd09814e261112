//! Domain types for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! that live inside the repositories.

pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod region;
pub mod session;
pub mod user;

pub use address::Address;
pub use cart::CartLine;
pub use order::{Order, OrderConfirmation, OrderConfirmationLine};
pub use product::Product;
pub use region::Region;
pub use session::{CurrentUser, session_keys};
pub use user::{Customer, User};
