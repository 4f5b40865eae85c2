//! Bank Account Model
//!
//! Destination accounts for manual bank transfers. Read-only from the
//! order/payment core's perspective; admins manage them through CRUD.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

pub type AccountId = RecordId;

/// Destination bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<AccountId>,
    pub bank_name: String,
    pub account_number: String,
    pub holder_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AccountCreate {
    #[validate(length(min = 1, max = 60))]
    pub bank_name: String,
    #[validate(length(min = 4, max = 34))]
    pub account_number: String,
    #[validate(length(min = 1, max = 120))]
    pub holder_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AccountUpdate {
    #[validate(length(min = 1, max = 60))]
    pub bank_name: Option<String>,
    #[validate(length(min = 4, max = 34))]
    pub account_number: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub holder_name: Option<String>,
    pub is_active: Option<bool>,
}
