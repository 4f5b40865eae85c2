//! Bank Account API Handlers
//!
//! The active list is public so the payment form can show transfer
//! destinations before login; management is admin-only.

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Account, AccountCreate, AccountUpdate};
use crate::db::repository::{AccountRepository, RepoError};
use crate::utils::{AppError, AppResult};

fn map_repo(e: RepoError) -> AppError {
    match e {
        RepoError::NotFound(msg) => AppError::NotFound(msg),
        other => AppError::database(other.to_string()),
    }
}

/// GET /api/accounts - active destination accounts (public)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Account>>> {
    let repo = AccountRepository::new(state.db.clone());
    let accounts = repo
        .find_all_active()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(accounts))
}

/// GET /api/accounts/all - every account including deactivated (admin)
pub async fn list_all(
    user: CurrentUser,
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<Account>>> {
    user.require_admin()?;

    let repo = AccountRepository::new(state.db.clone());
    let accounts = repo
        .find_all()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(accounts))
}

/// GET /api/accounts/{id} (admin)
pub async fn get_by_id(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Account>> {
    user.require_admin()?;

    let repo = AccountRepository::new(state.db.clone());
    let account = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Account {}", id)))?;
    Ok(Json(account))
}

/// POST /api/accounts (admin)
pub async fn create(
    user: CurrentUser,
    State(state): State<ServerState>,
    Json(payload): Json<AccountCreate>,
) -> AppResult<Json<Account>> {
    user.require_admin()?;
    payload.validate()?;

    let repo = AccountRepository::new(state.db.clone());
    let account = repo
        .create(payload)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(account = ?account.id, bank = %account.bank_name, "Account created");
    Ok(Json(account))
}

/// PUT /api/accounts/{id} (admin)
pub async fn update(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AccountUpdate>,
) -> AppResult<Json<Account>> {
    user.require_admin()?;
    payload.validate()?;

    let repo = AccountRepository::new(state.db.clone());
    let account = repo.update(&id, payload).await.map_err(map_repo)?;
    Ok(Json(account))
}

/// DELETE /api/accounts/{id} - soft delete (admin)
pub async fn deactivate(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Account>> {
    user.require_admin()?;

    let repo = AccountRepository::new(state.db.clone());
    let account = repo.deactivate(&id).await.map_err(map_repo)?;

    tracing::info!(account = ?account.id, "Account deactivated");
    Ok(Json(account))
}
