//! Order Model
//!
//! Orders are financial records: rows are created once, their `status` field
//! mutates through the lifecycle, and nothing ever deletes them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::order::OrderStatus;
use surrealdb::RecordId;
use validator::Validate;

pub type OrderId = RecordId;

/// Order model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<OrderId>,
    /// Owning member
    pub user: RecordId,
    /// Ordered product
    pub product: RecordId,
    /// Product name snapshot at order time
    pub product_name: String,
    /// Unit price snapshot at order time
    pub unit_price: Decimal,
    pub quantity: i64,
    /// unit_price * quantity, captured at creation and never recomputed
    pub total: Decimal,
    #[serde(default)]
    pub notes: String,
    pub status: OrderStatus,
    pub created_at: i64,
}

/// Row content for the transactional insert (no id; the repository assigns it)
#[derive(Debug, Clone, Serialize)]
pub struct OrderRow {
    pub user: RecordId,
    pub product: RecordId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub total: Decimal,
    pub notes: String,
    pub status: OrderStatus,
    pub created_at: i64,
}

/// Create-order request payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderCreate {
    pub product_id: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}
