//! Statistics API Handlers
//!
//! Read-only projections over the order ledger. Revenue counts an order once
//! its payment was verified (`InProduction` and later); `Rejected` orders and
//! orders still waiting on payment are excluded.

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::order::OrderStatus;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::OrderRepository;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Window start, unix millis (default: beginning of time)
    pub from: Option<i64>,
    /// Window end, unix millis (default: now)
    pub to: Option<i64>,
}

#[derive(Debug, Default, Serialize)]
pub struct StatusCounts {
    pub awaiting_payment: usize,
    pub awaiting_verification: usize,
    pub in_production: usize,
    pub shipping: usize,
    pub completed: usize,
    pub rejected: usize,
}

#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub from: i64,
    pub to: i64,
    pub total_orders: usize,
    pub by_status: StatusCounts,
    /// Sum of totals for orders with a verified payment
    pub paid_revenue: Decimal,
    /// Sum of totals still waiting on payment or verification
    pub pending_revenue: Decimal,
}

/// GET /api/statistics/summary (admin)
pub async fn summary(
    user: CurrentUser,
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<OrderSummary>> {
    user.require_admin()?;

    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or_else(shared::util::now_millis);
    if from > to {
        return Err(AppError::validation("from must not be after to"));
    }

    let repo = OrderRepository::new(state.db.clone());
    let orders = repo
        .find_in_range(from, to)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    let mut by_status = StatusCounts::default();
    let mut paid_revenue = Decimal::ZERO;
    let mut pending_revenue = Decimal::ZERO;

    for order in &orders {
        match order.status {
            OrderStatus::AwaitingPayment => {
                by_status.awaiting_payment += 1;
                pending_revenue += order.total;
            }
            OrderStatus::AwaitingVerification => {
                by_status.awaiting_verification += 1;
                pending_revenue += order.total;
            }
            OrderStatus::InProduction => {
                by_status.in_production += 1;
                paid_revenue += order.total;
            }
            OrderStatus::Shipping => {
                by_status.shipping += 1;
                paid_revenue += order.total;
            }
            OrderStatus::Completed => {
                by_status.completed += 1;
                paid_revenue += order.total;
            }
            OrderStatus::Rejected => by_status.rejected += 1,
        }
    }

    Ok(Json(OrderSummary {
        from,
        to,
        total_orders: orders.len(),
        by_status,
        paid_revenue,
        pending_revenue,
    }))
}
