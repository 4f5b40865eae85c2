//! Payment Repository
//!
//! Payment rows and the verification gate. Every write that decides a
//! payment also moves its order in the same transaction, so payment status
//! and order status can never be observed diverged. The compare-and-set on
//! `status = 'AWAITING_VERIFICATION'` makes decisions final: of two
//! concurrent verifies exactly one wins, and a rejected payment can never be
//! verified afterwards.

use super::{
    BaseRepository, ORDER_STATE_CONFLICT, PAYMENT_STATE_CONFLICT, RepoError, RepoResult,
    check_transaction, record_id,
};
use crate::db::models::{Order, Payment, PaymentRow};
use shared::order::{OrderStatus, PaymentStatus};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

const PAYMENT_TABLE: &str = "payment";

#[derive(Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Submit a proof of transfer.
    ///
    /// The order is flipped `AwaitingPayment -> AwaitingVerification` with a
    /// conditional update; the payment row is only created when that guard
    /// hits. Since submission is the only way a live payment comes into
    /// existence, the guard also enforces "at most one live payment per
    /// order": a second submission finds the order already moved on.
    pub async fn submit_for_order(&self, row: PaymentRow) -> RepoResult<(Payment, Order)> {
        let payment_id =
            RecordId::from_table_key(PAYMENT_TABLE, Uuid::new_v4().simple().to_string());
        let order = row.order_id.clone();

        let query = format!(
            r#"
            BEGIN TRANSACTION;
            LET $o = (UPDATE $order SET status = '{to}' WHERE status = '{from}');
            IF array::len($o) == 0 {{ THROW '{ORDER_STATE_CONFLICT}' }};
            CREATE $payment_id CONTENT $data;
            COMMIT TRANSACTION;
            "#,
            to = OrderStatus::AwaitingVerification.as_str(),
            from = OrderStatus::AwaitingPayment.as_str(),
        );

        let resp = self
            .base
            .db()
            .query(query)
            .bind(("order", order.clone()))
            .bind(("payment_id", payment_id.clone()))
            .bind(("data", row))
            .await?;
        check_transaction(resp)?;

        let payment: Option<Payment> = self.base.db().select(payment_id).await?;
        let payment =
            payment.ok_or_else(|| RepoError::Database("Payment missing after commit".into()))?;
        let order: Option<Order> = self.base.db().select(order).await?;
        let order =
            order.ok_or_else(|| RepoError::Database("Order missing after commit".into()))?;
        Ok((payment, order))
    }

    /// Verify a live payment; its order moves to `InProduction`.
    pub async fn verify(&self, id: &str) -> RepoResult<(Payment, Order)> {
        let thing = record_id(PAYMENT_TABLE, id);

        let query = format!(
            r#"
            BEGIN TRANSACTION;
            LET $p = (UPDATE $payment SET status = '{decided}', decided_at = $now WHERE status = '{live}');
            IF array::len($p) == 0 {{ THROW '{PAYMENT_STATE_CONFLICT}' }};
            UPDATE $p[0].order_id SET status = '{order_to}';
            COMMIT TRANSACTION;
            "#,
            decided = PaymentStatus::Verified.as_str(),
            live = PaymentStatus::AwaitingVerification.as_str(),
            order_to = OrderStatus::InProduction.as_str(),
        );

        let resp = self
            .base
            .db()
            .query(query)
            .bind(("payment", thing.clone()))
            .bind(("now", shared::util::now_millis()))
            .await?;
        check_transaction(resp)?;

        self.reload_with_order(thing).await
    }

    /// Reject a live payment with notes; its order returns to
    /// `AwaitingPayment` so the buyer can resubmit.
    ///
    /// `restock` optionally gives the reserved stock back. The original
    /// system never did; the policy is configurable and the restore happens
    /// inside the same transaction when enabled.
    pub async fn reject(
        &self,
        id: &str,
        notes: String,
        restock: bool,
    ) -> RepoResult<(Payment, Order)> {
        let thing = record_id(PAYMENT_TABLE, id);

        let restock_stmt = if restock {
            "UPDATE $o[0].product SET stock += $o[0].quantity;"
        } else {
            ""
        };

        let query = format!(
            r#"
            BEGIN TRANSACTION;
            LET $p = (UPDATE $payment SET status = '{decided}', notes = $notes, decided_at = $now WHERE status = '{live}');
            IF array::len($p) == 0 {{ THROW '{PAYMENT_STATE_CONFLICT}' }};
            LET $o = (UPDATE $p[0].order_id SET status = '{order_to}');
            {restock_stmt}
            COMMIT TRANSACTION;
            "#,
            decided = PaymentStatus::Rejected.as_str(),
            live = PaymentStatus::AwaitingVerification.as_str(),
            order_to = OrderStatus::AwaitingPayment.as_str(),
        );

        let resp = self
            .base
            .db()
            .query(query)
            .bind(("payment", thing.clone()))
            .bind(("notes", notes))
            .bind(("now", shared::util::now_millis()))
            .await?;
        check_transaction(resp)?;

        self.reload_with_order(thing).await
    }

    async fn reload_with_order(&self, payment_id: RecordId) -> RepoResult<(Payment, Order)> {
        let payment: Option<Payment> = self.base.db().select(payment_id).await?;
        let payment =
            payment.ok_or_else(|| RepoError::Database("Payment missing after commit".into()))?;
        let order: Option<Order> = self.base.db().select(payment.order_id.clone()).await?;
        let order =
            order.ok_or_else(|| RepoError::Database("Order missing after commit".into()))?;
        Ok((payment, order))
    }

    /// Find payment by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Payment>> {
        let payment: Option<Payment> = self.base.db().select(record_id(PAYMENT_TABLE, id)).await?;
        Ok(payment)
    }

    /// Payments submitted against one order, oldest first
    pub async fn list_by_order(&self, order: RecordId) -> RepoResult<Vec<Payment>> {
        let payments: Vec<Payment> = self
            .base
            .db()
            .query("SELECT * FROM payment WHERE order_id = $order ORDER BY created_at ASC")
            .bind(("order", order))
            .await?
            .take(0)?;
        Ok(payments)
    }

    /// Payments in one status, oldest first (admin verification queue)
    pub async fn list_by_status(&self, status: PaymentStatus) -> RepoResult<Vec<Payment>> {
        let query = format!(
            "SELECT * FROM payment WHERE status = '{}' ORDER BY created_at ASC",
            status.as_str()
        );
        let payments: Vec<Payment> = self.base.db().query(query).await?.take(0)?;
        Ok(payments)
    }

    /// Count live payments for one order (invariant check, used in tests)
    pub async fn count_live_for_order(&self, order: RecordId) -> RepoResult<usize> {
        let payments = self.list_by_order(order).await?;
        Ok(payments
            .iter()
            .filter(|p| !p.status.is_decided())
            .count())
    }
}
