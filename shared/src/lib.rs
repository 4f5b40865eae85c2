//! Shared types for the SelempangKu platform
//!
//! Domain vocabulary used by the server and any future client:
//! order/payment lifecycle statuses with the central transition table,
//! principal roles, and small time utilities.

pub mod order;
pub mod types;
pub mod util;

// Re-exports
pub use order::{FulfillmentPolicy, OrderStatus, PaymentStatus, TransitionError};
pub use types::Role;
