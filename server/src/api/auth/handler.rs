//! Auth API Handlers

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, password_hash::rand_core::OsRng};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::Role;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Member, MemberCreate, MemberResponse};
use crate::db::repository::{MemberRepository, RepoError};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub member: MemberResponse,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    payload.validate()?;

    let repo = MemberRepository::new(state.db.clone());
    let member = repo
        .find_by_username(&payload.username)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(AppError::invalid_credentials)?;

    let parsed = PasswordHash::new(&member.password_hash)
        .map_err(|e| AppError::internal(format!("Corrupt password hash: {e}")))?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed)
        .map_err(|_| AppError::invalid_credentials())?;

    let member_id = member
        .id
        .as_ref()
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::internal("Member row without id"))?;

    let token = state
        .jwt_service
        .generate_token(&member_id, &member.username, member.role.as_str())
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(target: "security", member = %member_id, "Member logged in");

    Ok(Json(LoginResponse {
        token,
        member: member.into_response(),
    }))
}

/// POST /api/auth/register - open customer registration
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<MemberCreate>,
) -> AppResult<Json<MemberResponse>> {
    payload.validate()?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?
        .to_string();

    let member = Member {
        id: None,
        username: payload.username,
        password_hash,
        name: payload.name,
        email: payload.email,
        role: Role::Customer,
        is_active: true,
        created_at: shared::util::now_millis(),
    };

    let repo = MemberRepository::new(state.db.clone());
    let created = repo.create(member).await.map_err(|e| match e {
        RepoError::Duplicate(msg) => AppError::Conflict(msg),
        other => AppError::database(other.to_string()),
    })?;

    Ok(Json(created.into_response()))
}
