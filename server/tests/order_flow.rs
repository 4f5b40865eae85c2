//! Order/payment lifecycle integration tests
//!
//! Runs against the in-memory engine with the real schema, repositories and
//! service, exactly as the binary wires them.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::Role;
use shared::order::{FulfillmentPolicy, OrderStatus, PaymentStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use selempang_server::auth::CurrentUser;
use selempang_server::db::DbService;
use selempang_server::db::models::{
    Account, AccountCreate, OrderCreate, PaymentSubmit, Product, ProductCreate, ProductUpdate,
};
use selempang_server::db::repository::{
    AccountRepository, OrderRepository, PaymentRepository, ProductRepository,
};
use selempang_server::orders::OrderService;
use selempang_server::services::{LogSink, NotificationService};
use selempang_server::utils::AppError;

struct TestEnv {
    db: Surreal<Db>,
    service: OrderService,
}

impl TestEnv {
    async fn new() -> Self {
        Self::with_policy(FulfillmentPolicy::Permissive, false).await
    }

    async fn with_policy(policy: FulfillmentPolicy, restock_on_reject: bool) -> Self {
        let db = DbService::memory().await.unwrap().db;
        let notifier = NotificationService::start(Arc::new(LogSink));
        let service = OrderService::new(db.clone(), notifier, policy, restock_on_reject);
        Self { db, service }
    }

    async fn seed_product(&self, stock: i64, unit_price: i64) -> Product {
        ProductRepository::new(self.db.clone())
            .create(ProductCreate {
                name: "Sash, single color".to_string(),
                description: None,
                unit_price: Decimal::from(unit_price),
                stock,
                image: None,
            })
            .await
            .unwrap()
    }

    async fn seed_account(&self) -> Account {
        AccountRepository::new(self.db.clone())
            .create(AccountCreate {
                bank_name: "BCA".to_string(),
                account_number: "1234567890".to_string(),
                holder_name: "PT SelempangKu".to_string(),
            })
            .await
            .unwrap()
    }

    async fn reload_product(&self, product: &Product) -> Product {
        let id = product.id.as_ref().unwrap().to_string();
        ProductRepository::new(self.db.clone())
            .find_by_id(&id)
            .await
            .unwrap()
            .unwrap()
    }

    fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone())
    }

    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.db.clone())
    }

    fn payments(&self) -> PaymentRepository {
        PaymentRepository::new(self.db.clone())
    }
}

fn customer(name: &str) -> CurrentUser {
    CurrentUser {
        id: format!("member:{name}"),
        username: name.to_string(),
        role: Role::Customer,
    }
}

fn admin() -> CurrentUser {
    CurrentUser {
        id: "member:admin".to_string(),
        username: "admin".to_string(),
        role: Role::Admin,
    }
}

fn order_request(product: &Product, quantity: i64) -> OrderCreate {
    OrderCreate {
        product_id: product.id.as_ref().unwrap().to_string(),
        quantity,
        notes: None,
    }
}

fn payment_request(account: &Account) -> PaymentSubmit {
    PaymentSubmit {
        account_id: account.id.as_ref().unwrap().to_string(),
        proof: "proof/transfer-001.jpg".to_string(),
    }
}

#[tokio::test]
async fn full_lifecycle_reject_then_verify() {
    let env = TestEnv::new().await;
    let product = env.seed_product(10, 150_000).await;
    let account = env.seed_account().await;
    let buyer = customer("budi");

    // Order: stock reserved, price snapshotted
    let order = env
        .service
        .create_order(&buyer, order_request(&product, 3))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::AwaitingPayment);
    assert_eq!(order.total, Decimal::from(450_000));
    assert_eq!(env.reload_product(&product).await.stock, 7);

    let order_id = order.id.as_ref().unwrap().to_string();

    // First proof, rejected with notes
    let first = env
        .service
        .submit_payment(&buyer, &order_id, payment_request(&account))
        .await
        .unwrap();
    assert_eq!(first.status, PaymentStatus::AwaitingVerification);

    let first_id = first.id.as_ref().unwrap().to_string();
    let (rejected, order_after) = env
        .service
        .reject_payment(&admin(), &first_id, Some("Amount mismatch".to_string()))
        .await
        .unwrap();
    assert_eq!(rejected.status, PaymentStatus::Rejected);
    assert_eq!(rejected.notes, "Amount mismatch");
    assert!(rejected.decided_at.is_some());
    assert_eq!(order_after.status, OrderStatus::AwaitingPayment);

    // Rejection does not restock by default
    assert_eq!(env.reload_product(&product).await.stock, 7);

    // Second proof, verified
    let second = env
        .service
        .submit_payment(&buyer, &order_id, payment_request(&account))
        .await
        .unwrap();
    let second_id = second.id.as_ref().unwrap().to_string();

    let (verified, order_after) = env
        .service
        .verify_payment(&admin(), &second_id)
        .await
        .unwrap();
    assert_eq!(verified.status, PaymentStatus::Verified);
    assert_eq!(order_after.status, OrderStatus::InProduction);

    // Full history kept, no live payment remains
    let payments = env
        .payments()
        .list_by_order(order.id.clone().unwrap())
        .await
        .unwrap();
    assert_eq!(payments.len(), 2);
    let live = env
        .payments()
        .count_live_for_order(order.id.clone().unwrap())
        .await
        .unwrap();
    assert_eq!(live, 0);
}

#[tokio::test]
async fn verify_is_final() {
    let env = TestEnv::new().await;
    let product = env.seed_product(5, 100_000).await;
    let account = env.seed_account().await;
    let buyer = customer("siti");

    let order = env
        .service
        .create_order(&buyer, order_request(&product, 1))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();
    let payment = env
        .service
        .submit_payment(&buyer, &order_id, payment_request(&account))
        .await
        .unwrap();
    let payment_id = payment.id.as_ref().unwrap().to_string();

    env.service
        .verify_payment(&admin(), &payment_id)
        .await
        .unwrap();

    // Second verify refused, order untouched
    let err = env
        .service
        .verify_payment(&admin(), &payment_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "got {err:?}");

    // A verified payment can never be rejected either
    let err = env
        .service
        .reject_payment(&admin(), &payment_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "got {err:?}");

    let order = env.orders().find_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::InProduction);
}

#[tokio::test]
async fn one_live_payment_per_order() {
    let env = TestEnv::new().await;
    let product = env.seed_product(5, 100_000).await;
    let account = env.seed_account().await;
    let buyer = customer("andi");

    let order = env
        .service
        .create_order(&buyer, order_request(&product, 1))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    env.service
        .submit_payment(&buyer, &order_id, payment_request(&account))
        .await
        .unwrap();

    let err = env
        .service
        .submit_payment(&buyer, &order_id, payment_request(&account))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "got {err:?}");

    let live = env
        .payments()
        .count_live_for_order(order.id.clone().unwrap())
        .await
        .unwrap();
    assert_eq!(live, 1);
}

#[tokio::test]
async fn insufficient_stock_refused() {
    let env = TestEnv::new().await;
    let product = env.seed_product(2, 100_000).await;
    let buyer = customer("rina");

    let err = env
        .service
        .create_order(&buyer, order_request(&product, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::OutOfStock(_)), "got {err:?}");

    // Nothing reserved, nothing written
    assert_eq!(env.reload_product(&product).await.stock, 2);
    assert!(env.orders().find_all(10, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn inactive_product_refused() {
    let env = TestEnv::new().await;
    let product = env.seed_product(5, 100_000).await;
    let product_id = product.id.as_ref().unwrap().to_string();
    env.products().deactivate(&product_id).await.unwrap();

    let err = env
        .service
        .create_order(&customer("dewi"), order_request(&product, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ProductUnavailable(_)), "got {err:?}");
}

#[tokio::test]
async fn only_the_owner_submits_payment() {
    let env = TestEnv::new().await;
    let product = env.seed_product(5, 100_000).await;
    let account = env.seed_account().await;

    let order = env
        .service
        .create_order(&customer("owner"), order_request(&product, 1))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    let err = env
        .service
        .submit_payment(&customer("intruder"), &order_id, payment_request(&account))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
}

#[tokio::test]
async fn non_admin_cannot_decide_payments() {
    let env = TestEnv::new().await;
    let product = env.seed_product(5, 100_000).await;
    let account = env.seed_account().await;
    let buyer = customer("budi");

    let order = env
        .service
        .create_order(&buyer, order_request(&product, 1))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();
    let payment = env
        .service
        .submit_payment(&buyer, &order_id, payment_request(&account))
        .await
        .unwrap();
    let payment_id = payment.id.as_ref().unwrap().to_string();

    let err = env
        .service
        .verify_payment(&buyer, &payment_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");

    let err = env
        .service
        .advance_fulfillment(&buyer, &order_id, OrderStatus::Shipping)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
}

#[tokio::test]
async fn total_survives_price_changes() {
    let env = TestEnv::new().await;
    let product = env.seed_product(10, 150_000).await;
    let product_id = product.id.as_ref().unwrap().to_string();
    let buyer = customer("budi");

    let order = env
        .service
        .create_order(&buyer, order_request(&product, 2))
        .await
        .unwrap();
    assert_eq!(order.total, Decimal::from(300_000));

    env.products()
        .update(
            &product_id,
            ProductUpdate {
                name: None,
                description: None,
                unit_price: Some(Decimal::from(200_000)),
                stock: None,
                image: None,
                is_active: None,
            },
        )
        .await
        .unwrap();

    // Existing order keeps its snapshot; a new order sees the new price
    let order_id = order.id.as_ref().unwrap().to_string();
    let reloaded = env.orders().find_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(reloaded.total, Decimal::from(300_000));
    assert_eq!(reloaded.unit_price, Decimal::from(150_000));

    let fresh = env
        .service
        .create_order(&buyer, order_request(&product, 1))
        .await
        .unwrap();
    assert_eq!(fresh.total, Decimal::from(200_000));
}

#[tokio::test]
async fn restock_on_reject_returns_stock() {
    let env = TestEnv::with_policy(FulfillmentPolicy::Permissive, true).await;
    let product = env.seed_product(4, 100_000).await;
    let account = env.seed_account().await;
    let buyer = customer("budi");

    let order = env
        .service
        .create_order(&buyer, order_request(&product, 3))
        .await
        .unwrap();
    assert_eq!(env.reload_product(&product).await.stock, 1);

    let order_id = order.id.as_ref().unwrap().to_string();
    let payment = env
        .service
        .submit_payment(&buyer, &order_id, payment_request(&account))
        .await
        .unwrap();
    let payment_id = payment.id.as_ref().unwrap().to_string();

    env.service
        .reject_payment(&admin(), &payment_id, Some("Wrong account".to_string()))
        .await
        .unwrap();

    assert_eq!(env.reload_product(&product).await.stock, 4);
}

async fn paid_order(env: &TestEnv, buyer: &CurrentUser) -> String {
    let product = env.seed_product(5, 100_000).await;
    let account = env.seed_account().await;
    let order = env
        .service
        .create_order(buyer, order_request(&product, 1))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();
    let payment = env
        .service
        .submit_payment(buyer, &order_id, payment_request(&account))
        .await
        .unwrap();
    env.service
        .verify_payment(&admin(), &payment.id.as_ref().unwrap().to_string())
        .await
        .unwrap();
    order_id
}

#[tokio::test]
async fn permissive_fulfillment_allows_any_enumerated_target() {
    let env = TestEnv::new().await;
    let buyer = customer("budi");
    let order_id = paid_order(&env, &buyer).await;

    let order = env
        .service
        .advance_fulfillment(&admin(), &order_id, OrderStatus::Shipping)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipping);

    let order = env
        .service
        .advance_fulfillment(&admin(), &order_id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Completed);

    // Permissive mode even allows moving back
    let order = env
        .service
        .advance_fulfillment(&admin(), &order_id, OrderStatus::Shipping)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipping);

    // But never to a non-advance target
    let err = env
        .service
        .advance_fulfillment(&admin(), &order_id, OrderStatus::AwaitingPayment)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn strict_fulfillment_is_forward_only() {
    let env = TestEnv::with_policy(FulfillmentPolicy::Strict, false).await;
    let buyer = customer("budi");
    let order_id = paid_order(&env, &buyer).await;

    // Skipping a stage is refused
    let err = env
        .service
        .advance_fulfillment(&admin(), &order_id, OrderStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "got {err:?}");

    env.service
        .advance_fulfillment(&admin(), &order_id, OrderStatus::Shipping)
        .await
        .unwrap();
    let order = env
        .service
        .advance_fulfillment(&admin(), &order_id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Completed);

    // Completed is terminal
    let err = env
        .service
        .advance_fulfillment(&admin(), &order_id, OrderStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "got {err:?}");
}

#[tokio::test]
async fn strict_fulfillment_allows_reject_before_terminal() {
    let env = TestEnv::with_policy(FulfillmentPolicy::Strict, false).await;
    let buyer = customer("budi");
    let order_id = paid_order(&env, &buyer).await;

    env.service
        .advance_fulfillment(&admin(), &order_id, OrderStatus::Shipping)
        .await
        .unwrap();
    let order = env
        .service
        .advance_fulfillment(&admin(), &order_id, OrderStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Rejected);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let env = TestEnv::new().await;
    let account = env.seed_account().await;
    let buyer = customer("budi");

    let err = env
        .service
        .create_order(
            &buyer,
            OrderCreate {
                product_id: "product:nope".to_string(),
                quantity: 1,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    let err = env
        .service
        .submit_payment(&buyer, "order:nope", payment_request(&account))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    let err = env
        .service
        .verify_payment(&admin(), "payment:nope")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}
