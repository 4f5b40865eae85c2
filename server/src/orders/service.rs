//! Order/payment lifecycle service
//!
//! Composes the repositories into the five lifecycle operations:
//!
//! - create order (atomic stock reservation + price snapshot)
//! - submit payment (order gate enforces one live payment per order)
//! - verify payment (payment and order move together)
//! - reject payment (loops the order back for resubmission)
//! - advance fulfillment (admin, policy-checked)
//!
//! Status preconditions are enforced twice: a friendly pre-read produces the
//! precise error for the common case, and the conditional update inside the
//! repository transaction stays authoritative under concurrency.

use rust_decimal::Decimal;
use shared::order::{OrderStatus, PaymentStatus, TransitionError};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderRow, Payment, PaymentRow, PaymentSubmit};
use crate::db::repository::{
    AccountRepository, OUT_OF_STOCK, OrderRepository, PaymentRepository, ProductRepository,
    RepoError, record_id,
};
use crate::services::{NotificationEvent, NotificationService};
use crate::utils::{AppError, AppResult};
use shared::order::FulfillmentPolicy;

const MEMBER_TABLE: &str = "member";

/// Lifecycle service over the order and payment ledgers
#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    payments: PaymentRepository,
    products: ProductRepository,
    accounts: AccountRepository,
    notifier: NotificationService,
    policy: FulfillmentPolicy,
    restock_on_reject: bool,
}

impl OrderService {
    pub fn new(
        db: Surreal<Db>,
        notifier: NotificationService,
        policy: FulfillmentPolicy,
        restock_on_reject: bool,
    ) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            payments: PaymentRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            accounts: AccountRepository::new(db),
            notifier,
            policy,
            restock_on_reject,
        }
    }

    pub fn from_state(state: &ServerState) -> Self {
        Self::new(
            state.db.clone(),
            state.notifier.clone(),
            state.config.fulfillment_policy,
            state.config.restock_on_reject,
        )
    }

    /// Place an order: atomically reserve stock and snapshot the price.
    pub async fn create_order(&self, user: &CurrentUser, req: OrderCreate) -> AppResult<Order> {
        req.validate()?;

        let product = self
            .products
            .find_by_id(&req.product_id)
            .await
            .map_err(map_repo)?
            .ok_or_else(|| AppError::not_found(format!("Product {}", req.product_id)))?;

        if !product.is_active {
            return Err(AppError::ProductUnavailable(format!(
                "Product {} is not available",
                product.name
            )));
        }
        if product.stock < req.quantity {
            return Err(AppError::OutOfStock(format!(
                "Only {} left of {}",
                product.stock, product.name
            )));
        }

        let product_id = product
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Product row without id"))?;
        let total = product.unit_price * Decimal::from(req.quantity);

        let row = OrderRow {
            user: record_id(MEMBER_TABLE, &user.id),
            product: product_id,
            product_name: product.name.clone(),
            unit_price: product.unit_price,
            quantity: req.quantity,
            total,
            notes: req.notes.unwrap_or_default(),
            status: OrderStatus::AwaitingPayment,
            created_at: shared::util::now_millis(),
        };

        let order = match self.orders.create_with_reservation(row).await {
            Ok(order) => order,
            // The reservation guard merges "no stock" and "went inactive";
            // re-read to report the precise cause
            Err(RepoError::StateConflict(m)) if m == OUT_OF_STOCK => {
                let current = self.products.find_by_id(&req.product_id).await.ok().flatten();
                return Err(match current {
                    Some(p) if !p.is_active => AppError::ProductUnavailable(format!(
                        "Product {} is not available",
                        p.name
                    )),
                    _ => AppError::OutOfStock(format!("Not enough stock of {}", product.name)),
                });
            }
            Err(e) => return Err(map_repo(e)),
        };

        tracing::info!(
            order = %display_id(&order.id),
            user = %user.id,
            quantity = order.quantity,
            %total,
            "Order created"
        );
        self.notifier.dispatch(NotificationEvent::OrderCreated {
            order_id: display_id(&order.id),
            user_id: user.id.clone(),
            total: order.total.to_string(),
        });

        Ok(order)
    }

    /// Submit a proof of transfer against an order the caller owns.
    pub async fn submit_payment(
        &self,
        user: &CurrentUser,
        order_id: &str,
        req: PaymentSubmit,
    ) -> AppResult<Payment> {
        req.validate()?;

        let order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(map_repo)?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        if order.user != record_id(MEMBER_TABLE, &user.id) {
            return Err(AppError::forbidden("Not your order"));
        }
        if order.status != OrderStatus::AwaitingPayment {
            return Err(AppError::invalid_state(format!(
                "Order is {}, not awaiting payment",
                order.status
            )));
        }

        let account = self
            .accounts
            .find_by_id(&req.account_id)
            .await
            .map_err(map_repo)?
            .ok_or_else(|| AppError::not_found(format!("Account {}", req.account_id)))?;
        if !account.is_active {
            return Err(AppError::validation("Destination account is not active"));
        }

        let row = PaymentRow {
            order_id: order
                .id
                .clone()
                .ok_or_else(|| AppError::internal("Order row without id"))?,
            user: record_id(MEMBER_TABLE, &user.id),
            account: account
                .id
                .clone()
                .ok_or_else(|| AppError::internal("Account row without id"))?,
            amount: order.total,
            proof: req.proof,
            status: PaymentStatus::AwaitingVerification,
            notes: String::new(),
            created_at: shared::util::now_millis(),
            decided_at: None,
        };

        let (payment, order) = match self.payments.submit_for_order(row).await {
            Ok(pair) => pair,
            Err(RepoError::StateConflict(_)) => {
                return Err(AppError::invalid_state(
                    "Order already has a payment awaiting verification",
                ));
            }
            Err(e) => return Err(map_repo(e)),
        };

        tracing::info!(
            payment = %display_id(&payment.id),
            order = %display_id(&order.id),
            user = %user.id,
            "Payment proof submitted"
        );
        self.notifier.dispatch(NotificationEvent::PaymentSubmitted {
            order_id: display_id(&order.id),
            payment_id: display_id(&payment.id),
            user_id: user.id.clone(),
        });

        Ok(payment)
    }

    /// Verify a live payment (admin). Payment becomes `Verified`, its order
    /// moves to `InProduction`. Repeats fail `InvalidState`: decisions are
    /// final and side effects fire exactly once.
    pub async fn verify_payment(
        &self,
        admin: &CurrentUser,
        payment_id: &str,
    ) -> AppResult<(Payment, Order)> {
        admin.require_admin()?;

        // Distinguish "no such payment" from "already decided"
        let existing = self
            .payments
            .find_by_id(payment_id)
            .await
            .map_err(map_repo)?
            .ok_or_else(|| AppError::not_found(format!("Payment {}", payment_id)))?;

        let (payment, order) = match self.payments.verify(payment_id).await {
            Ok(pair) => pair,
            Err(RepoError::StateConflict(_)) => {
                return Err(AppError::invalid_state(format!(
                    "Payment already {}",
                    existing.status
                )));
            }
            Err(e) => return Err(map_repo(e)),
        };

        tracing::info!(
            payment = %display_id(&payment.id),
            order = %display_id(&order.id),
            admin = %admin.id,
            "Payment verified"
        );
        self.notifier.dispatch(NotificationEvent::PaymentVerified {
            order_id: display_id(&order.id),
            payment_id: display_id(&payment.id),
            user_id: payment.user.to_string(),
        });

        Ok((payment, order))
    }

    /// Reject a live payment with notes (admin). The order returns to
    /// `AwaitingPayment`; the buyer may submit a new proof.
    pub async fn reject_payment(
        &self,
        admin: &CurrentUser,
        payment_id: &str,
        notes: Option<String>,
    ) -> AppResult<(Payment, Order)> {
        admin.require_admin()?;

        let existing = self
            .payments
            .find_by_id(payment_id)
            .await
            .map_err(map_repo)?
            .ok_or_else(|| AppError::not_found(format!("Payment {}", payment_id)))?;

        let notes = notes.unwrap_or_default();
        let (payment, order) = match self
            .payments
            .reject(payment_id, notes, self.restock_on_reject)
            .await
        {
            Ok(pair) => pair,
            Err(RepoError::StateConflict(_)) => {
                return Err(AppError::invalid_state(format!(
                    "Payment already {}",
                    existing.status
                )));
            }
            Err(e) => return Err(map_repo(e)),
        };

        tracing::info!(
            payment = %display_id(&payment.id),
            order = %display_id(&order.id),
            admin = %admin.id,
            restocked = self.restock_on_reject,
            "Payment rejected"
        );
        self.notifier.dispatch(NotificationEvent::PaymentRejected {
            order_id: display_id(&order.id),
            payment_id: display_id(&payment.id),
            user_id: payment.user.to_string(),
            notes: payment.notes.clone(),
        });

        Ok((payment, order))
    }

    /// Move an order through the fulfillment stages (admin).
    pub async fn advance_fulfillment(
        &self,
        admin: &CurrentUser,
        order_id: &str,
        target: OrderStatus,
    ) -> AppResult<Order> {
        admin.require_admin()?;

        let order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(map_repo)?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        self.policy
            .validate_advance(order.status, target)
            .map_err(|e| match e {
                TransitionError::NotAdvanceTarget(_) => AppError::validation(e.to_string()),
                TransitionError::Illegal { .. } => AppError::invalid_state(e.to_string()),
            })?;

        // Strict mode compare-and-sets against the status we validated;
        // permissive mode writes unconditionally, as the original did
        let expected = match self.policy {
            FulfillmentPolicy::Strict => Some(order.status),
            FulfillmentPolicy::Permissive => None,
        };

        let updated = self
            .orders
            .set_status(order_id, target, expected)
            .await
            .map_err(map_repo)?;

        let order = match updated {
            Some(order) => order,
            None => {
                return Err(match self.orders.find_by_id(order_id).await {
                    Ok(Some(_)) => {
                        AppError::invalid_state("Order status changed concurrently")
                    }
                    _ => AppError::not_found(format!("Order {}", order_id)),
                });
            }
        };

        tracing::info!(
            order = %display_id(&order.id),
            admin = %admin.id,
            status = %order.status,
            "Fulfillment status advanced"
        );
        self.notifier
            .dispatch(NotificationEvent::FulfillmentAdvanced {
                order_id: display_id(&order.id),
                user_id: order.user.to_string(),
                status: order.status.to_string(),
            });

        Ok(order)
    }
}

/// Map repository errors to the API taxonomy.
///
/// `StateConflict` is handled per call site; reaching here with one means a
/// precondition marker was not translated, which is a bug worth surfacing.
fn map_repo(e: RepoError) -> AppError {
    match e {
        RepoError::NotFound(msg) => AppError::NotFound(msg),
        RepoError::Duplicate(msg) => AppError::Conflict(msg),
        RepoError::Validation(msg) => AppError::Validation(msg),
        RepoError::StateConflict(msg) => AppError::Internal(format!(
            "Unhandled state conflict: {msg}"
        )),
        RepoError::Database(msg) => AppError::Database(msg),
    }
}

fn display_id(id: &Option<surrealdb::RecordId>) -> String {
    id.as_ref().map(|i| i.to_string()).unwrap_or_default()
}
