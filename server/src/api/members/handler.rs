//! Member API Handlers
//!
//! Administration surface. Members register through `/api/auth/register`;
//! here admins list, inspect and deactivate them, and any logged-in member
//! can fetch their own profile.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::MemberResponse;
use crate::db::repository::{MemberRepository, RepoError};
use crate::utils::{AppError, AppResult};

/// GET /api/members (admin)
pub async fn list(
    user: CurrentUser,
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<MemberResponse>>> {
    user.require_admin()?;

    let repo = MemberRepository::new(state.db.clone());
    let members = repo
        .find_all()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(members.into_iter().map(|m| m.into_response()).collect()))
}

/// GET /api/members/me - the caller's own profile
pub async fn me(
    user: CurrentUser,
    State(state): State<ServerState>,
) -> AppResult<Json<MemberResponse>> {
    let repo = MemberRepository::new(state.db.clone());
    let member = repo
        .find_by_id(&user.id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found("Member"))?;
    Ok(Json(member.into_response()))
}

/// GET /api/members/{id} (admin)
pub async fn get_by_id(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MemberResponse>> {
    user.require_admin()?;

    let repo = MemberRepository::new(state.db.clone());
    let member = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Member {}", id)))?;
    Ok(Json(member.into_response()))
}

/// DELETE /api/members/{id} - soft delete (admin)
///
/// Orders keep referencing deactivated members; the row stays.
pub async fn deactivate(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MemberResponse>> {
    user.require_admin()?;

    let repo = MemberRepository::new(state.db.clone());
    let member = repo.deactivate(&id).await.map_err(|e| match e {
        RepoError::NotFound(msg) => AppError::NotFound(msg),
        other => AppError::database(other.to_string()),
    })?;

    tracing::info!(target: "security", member = %id, admin = %user.id, "Member deactivated");
    Ok(Json(member.into_response()))
}
