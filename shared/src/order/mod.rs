//! Order and payment lifecycle types
//!
//! The status enums and the transition table are the single point of truth
//! for "is this transition legal". Repositories compare-and-set against the
//! string forms; handlers never hand-check status fields themselves.

mod status;

pub use status::{FulfillmentPolicy, OrderStatus, PaymentStatus, TransitionError};
