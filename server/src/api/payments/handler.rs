//! Payment API Handlers
//!
//! The admin verification queue and the two decisions. Decisions go through
//! [`OrderService`] so payment and order always move together.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::order::PaymentStatus;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, Payment};
use crate::db::repository::PaymentRepository;
use crate::orders::OrderService;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub status: Option<String>,
}

/// Decision result: the payment together with the order it moved
#[derive(Debug, Serialize)]
pub struct PaymentDecision {
    pub payment: Payment,
    pub order: Order,
}

/// GET /api/payments - verification queue (admin)
///
/// Defaults to payments awaiting verification, oldest first; `?status=`
/// filters on any status.
pub async fn list(
    user: CurrentUser,
    State(state): State<ServerState>,
    Query(query): Query<PaymentListQuery>,
) -> AppResult<Json<Vec<Payment>>> {
    user.require_admin()?;

    let status = match query.status {
        Some(raw) => raw
            .parse::<PaymentStatus>()
            .map_err(|e: String| AppError::validation(e))?,
        None => PaymentStatus::AwaitingVerification,
    };

    let repo = PaymentRepository::new(state.db.clone());
    let payments = repo
        .list_by_status(status)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(payments))
}

/// GET /api/payments/{id} (admin)
pub async fn get_by_id(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Payment>> {
    user.require_admin()?;

    let repo = PaymentRepository::new(state.db.clone());
    let payment = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Payment {}", id)))?;
    Ok(Json(payment))
}

/// POST /api/payments/{id}/verify (admin)
pub async fn verify(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<PaymentDecision>> {
    let service = OrderService::from_state(&state);
    let (payment, order) = service.verify_payment(&user, &id).await?;
    Ok(Json(PaymentDecision { payment, order }))
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub notes: Option<String>,
}

/// POST /api/payments/{id}/reject (admin)
pub async fn reject(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<PaymentDecision>> {
    let service = OrderService::from_state(&state);
    let (payment, order) = service.reject_payment(&user, &id, payload.notes).await?;
    Ok(Json(PaymentDecision { payment, order }))
}
