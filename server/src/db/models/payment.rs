//! Payment Model
//!
//! A payment is a proof-of-transfer submission against one order. Several
//! payments may exist per order across reject/resubmit cycles, but at most
//! one may be awaiting verification at any time. Decided payments are
//! immutable; rows are never deleted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::order::PaymentStatus;
use surrealdb::RecordId;
use validator::Validate;

pub type PaymentId = RecordId;

/// Payment model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Option<PaymentId>,
    /// Order this proof was submitted against
    pub order_id: RecordId,
    /// Submitting member
    pub user: RecordId,
    /// Destination bank account
    pub account: RecordId,
    /// Copied from the order total at submission time
    pub amount: Decimal,
    /// Opaque reference to the uploaded proof of transfer
    pub proof: String,
    pub status: PaymentStatus,
    /// Verification notes, set on rejection
    #[serde(default)]
    pub notes: String,
    pub created_at: i64,
    pub decided_at: Option<i64>,
}

/// Row content for the transactional insert
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRow {
    pub order_id: RecordId,
    pub user: RecordId,
    pub account: RecordId,
    pub amount: Decimal,
    pub proof: String,
    pub status: PaymentStatus,
    pub notes: String,
    pub created_at: i64,
    pub decided_at: Option<i64>,
}

/// Submit-payment request payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaymentSubmit {
    pub account_id: String,
    /// Reference to the uploaded transfer proof
    #[validate(length(min = 1, max = 300))]
    pub proof: String,
}
