//! On-disk persistence test
//!
//! The integration tests run on the in-memory engine; this one opens the
//! RocksDB backend the binary uses and checks that orders and reserved stock
//! survive a close/reopen cycle.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::Role;
use shared::order::{FulfillmentPolicy, OrderStatus};

use selempang_server::auth::CurrentUser;
use selempang_server::db::DbService;
use selempang_server::db::models::{OrderCreate, ProductCreate};
use selempang_server::db::repository::{OrderRepository, ProductRepository};
use selempang_server::orders::OrderService;
use selempang_server::services::{LogSink, NotificationService};

#[tokio::test]
async fn orders_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("selempangku.db");
    let db_path = db_path.to_string_lossy().to_string();

    let buyer = CurrentUser {
        id: "member:budi".to_string(),
        username: "budi".to_string(),
        role: Role::Customer,
    };

    let order_id;
    let product_id;
    {
        let db = DbService::new(&db_path).await.unwrap().db;
        let notifier = NotificationService::start(Arc::new(LogSink));
        let service =
            OrderService::new(db.clone(), notifier, FulfillmentPolicy::Permissive, false);

        let product = ProductRepository::new(db.clone())
            .create(ProductCreate {
                name: "Graduation sash".to_string(),
                description: None,
                unit_price: Decimal::from(150_000),
                stock: 10,
                image: None,
            })
            .await
            .unwrap();
        product_id = product.id.as_ref().unwrap().to_string();

        let order = service
            .create_order(
                &buyer,
                OrderCreate {
                    product_id: product_id.clone(),
                    quantity: 4,
                    notes: Some("Blue trim".to_string()),
                },
            )
            .await
            .unwrap();
        order_id = order.id.as_ref().unwrap().to_string();
    }
    // Handles dropped; RocksDB releases the directory lock

    let db = DbService::new(&db_path).await.unwrap().db;

    let order = OrderRepository::new(db.clone())
        .find_by_id(&order_id)
        .await
        .unwrap()
        .expect("order lost across reopen");
    assert_eq!(order.status, OrderStatus::AwaitingPayment);
    assert_eq!(order.quantity, 4);
    assert_eq!(order.total, Decimal::from(600_000));
    assert_eq!(order.notes, "Blue trim");

    let product = ProductRepository::new(db)
        .find_by_id(&product_id)
        .await
        .unwrap()
        .expect("product lost across reopen");
    assert_eq!(product.stock, 6);
}
