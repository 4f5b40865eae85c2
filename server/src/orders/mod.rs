//! Order/payment lifecycle module
//!
//! [`OrderService`] is the single entry point for every mutation of the
//! order and payment ledgers. Handlers never write those tables directly.

mod service;

pub use service::OrderService;
