//! Order API Handlers
//!
//! Thin layer over [`OrderService`]: extract the principal, hand the request
//! to the service, serialize the result. Authorization lives here only for
//! reads; every mutation is authorized inside the service.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::order::OrderStatus;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, Payment, PaymentSubmit};
use crate::db::repository::{OrderRepository, PaymentRepository, record_id};
use crate::orders::OrderService;
use crate::utils::{AppError, AppResult};

const MEMBER_TABLE: &str = "member";

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/orders - place an order
pub async fn create(
    user: CurrentUser,
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let service = OrderService::from_state(&state);
    let order = service.create_order(&user, payload).await?;
    Ok(Json(order))
}

/// GET /api/orders - admins see everything (paged), customers see their own
pub async fn list(
    user: CurrentUser,
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.db.clone());

    let orders = if user.is_admin() {
        let limit = query.limit.unwrap_or(100).clamp(1, 1000);
        let offset = query.offset.unwrap_or(0).max(0);
        repo.find_all(limit, offset)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
    } else {
        repo.find_by_user(record_id(MEMBER_TABLE, &user.id))
            .await
            .map_err(|e| AppError::database(e.to_string()))?
    };

    Ok(Json(orders))
}

/// GET /api/orders/{id} - owner or admin
pub async fn get_by_id(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;

    if !user.is_admin() && order.user != record_id(MEMBER_TABLE, &user.id) {
        return Err(AppError::forbidden("Not your order"));
    }

    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// PUT /api/orders/{id}/status - advance fulfillment (admin)
pub async fn advance_status(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<Order>> {
    let target: OrderStatus = payload
        .status
        .parse()
        .map_err(|e: String| AppError::validation(e))?;

    let service = OrderService::from_state(&state);
    let order = service.advance_fulfillment(&user, &id, target).await?;
    Ok(Json(order))
}

/// POST /api/orders/{id}/payments - submit a proof of transfer (owner)
pub async fn submit_payment(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentSubmit>,
) -> AppResult<Json<Payment>> {
    let service = OrderService::from_state(&state);
    let payment = service.submit_payment(&user, &id, payload).await?;
    Ok(Json(payment))
}

/// GET /api/orders/{id}/payments - payment history for one order
/// (owner or admin)
pub async fn list_payments(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Payment>>> {
    let orders = OrderRepository::new(state.db.clone());
    let order = orders
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;

    if !user.is_admin() && order.user != record_id(MEMBER_TABLE, &user.id) {
        return Err(AppError::forbidden("Not your order"));
    }

    let order_id = order
        .id
        .ok_or_else(|| AppError::internal("Order row without id"))?;
    let payments = PaymentRepository::new(state.db.clone())
        .list_by_order(order_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    Ok(Json(payments))
}
