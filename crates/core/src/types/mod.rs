//! Newtype wrappers shared across the workspace.

pub mod email;
pub mod id;
pub mod order_code;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{AddressId, CustomerId, OrderId, ProductId, UserId};
pub use order_code::{OrderCode, OrderCodeError};
pub use status::{OrderStatus, PaymentMethod};
