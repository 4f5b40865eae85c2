//! Database Models

pub mod account;
pub mod member;
pub mod order;
pub mod payment;
pub mod product;

// Re-exports
pub use account::{Account, AccountCreate, AccountUpdate};
pub use member::{Member, MemberCreate, MemberResponse};
pub use order::{Order, OrderCreate, OrderRow};
pub use payment::{Payment, PaymentRow, PaymentSubmit};
pub use product::{Product, ProductCreate, ProductUpdate};
