//! Order Repository
//!
//! Owns order creation (with the atomic stock reservation) and order status
//! writes. Status changes driven by payment decisions live in the payment
//! repository so payment and order move in one transaction.

use super::{BaseRepository, OUT_OF_STOCK, RepoError, RepoResult, check_transaction, record_id};
use crate::db::models::{Order, OrderRow};
use shared::order::OrderStatus;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

const ORDER_TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Atomically reserve stock and create the order.
    ///
    /// The decrement is a single conditional update: two concurrent orders
    /// for the last unit cannot both pass the `stock >= $qty` guard. When the
    /// guard misses (insufficient stock, or the product went inactive), the
    /// transaction is cancelled and nothing is written.
    pub async fn create_with_reservation(&self, row: OrderRow) -> RepoResult<Order> {
        let order_id = RecordId::from_table_key(ORDER_TABLE, Uuid::new_v4().simple().to_string());
        let product = row.product.clone();
        let quantity = row.quantity;

        let query = format!(
            r#"
            BEGIN TRANSACTION;
            LET $hit = (UPDATE $product SET stock -= $qty WHERE stock >= $qty AND is_active = true);
            IF array::len($hit) == 0 {{ THROW '{OUT_OF_STOCK}' }};
            CREATE $order_id CONTENT $data;
            COMMIT TRANSACTION;
            "#
        );

        let resp = self
            .base
            .db()
            .query(query)
            .bind(("product", product))
            .bind(("qty", quantity))
            .bind(("order_id", order_id.clone()))
            .bind(("data", row))
            .await?;
        check_transaction(resp)?;

        let created: Option<Order> = self.base.db().select(order_id).await?;
        created.ok_or_else(|| RepoError::Database("Order missing after commit".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(record_id(ORDER_TABLE, id)).await?;
        Ok(order)
    }

    /// All orders, newest first (admin)
    pub async fn find_all(&self, limit: i64, offset: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY created_at DESC LIMIT $limit START $offset")
            .bind(("limit", limit))
            .bind(("offset", offset))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders owned by one member, newest first
    pub async fn find_by_user(&self, user: RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Set the order status.
    ///
    /// With `expected` set this is a compare-and-set: the write only lands if
    /// the current status still matches, and `Ok(None)` means it no longer
    /// did (or the order does not exist — callers disambiguate with a read).
    pub async fn set_status(
        &self,
        id: &str,
        status: OrderStatus,
        expected: Option<OrderStatus>,
    ) -> RepoResult<Option<Order>> {
        let thing = record_id(ORDER_TABLE, id);

        let query = match expected {
            Some(from) => format!(
                "UPDATE $thing SET status = '{}' WHERE status = '{}' RETURN AFTER",
                status.as_str(),
                from.as_str()
            ),
            None => format!(
                "UPDATE $thing SET status = '{}' RETURN AFTER",
                status.as_str()
            ),
        };

        let orders: Vec<Order> = self
            .base
            .db()
            .query(query)
            .bind(("thing", thing))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Orders created inside a time window (reporting)
    pub async fn find_in_range(&self, from: i64, to: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM order WHERE created_at >= $from AND created_at <= $to ORDER BY created_at ASC",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .take(0)?;
        Ok(orders)
    }
}
