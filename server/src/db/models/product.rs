//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

pub type ProductId = RecordId;

/// Product model
///
/// `stock` is only ever mutated through the conditional decrement in the
/// order repository (and the optional restock on rejection); it can never go
/// negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unit price in IDR, fixed-point
    pub unit_price: Decimal,
    pub stock: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    #[validate(range(min = 0))]
    pub stock: i64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}
