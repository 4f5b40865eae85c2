//! Authentication middleware
//!
//! Extracts and validates the JWT from `Authorization: Bearer <token>` and
//! injects [`CurrentUser`] into the request extensions.
//!
//! # Paths that skip authentication
//!
//! - `OPTIONS *` (CORS preflight)
//! - anything outside `/api/`
//! - `/api/auth/login`, `/api/auth/register`
//! - `/api/health`
//! - `GET /api/products*` and `GET /api/accounts` (public catalog browsing)

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

fn is_public(method: &http::Method, path: &str) -> bool {
    if path == "/api/auth/login" || path == "/api/auth/register" || path == "/api/health" {
        return true;
    }
    // Catalog browsing and bank account listing are open to anonymous visitors
    if method == http::Method::GET
        && (path.starts_with("/api/products") || path == "/api/accounts")
    {
        return true;
    }
    false
}

/// Authentication middleware - requires a logged-in user
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path().to_string();

    // CORS preflight passes through
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes fall through to 404
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public(req.method(), &path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(JwtService::extract_from_header) {
        Some(token) => token,
        None => {
            tracing::warn!(target: "security", uri = %path, "Missing authorization header");
            return Err(AppError::Unauthorized);
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::Validation(format!("Malformed JWT claims: {e}")))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(target: "security", error = %e, uri = %path, "Authentication failed");
            match e {
                JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}
