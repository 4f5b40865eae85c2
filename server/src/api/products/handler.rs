//! Product API Handlers
//!
//! Catalog browsing is anonymous; everything that writes requires an admin.

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::ProductRepository;
use crate::utils::{AppError, AppResult};

/// GET /api/products - active catalog (public)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo
        .find_all_active()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(products))
}

/// GET /api/products/all - every product including deactivated (admin)
pub async fn list_all(
    user: CurrentUser,
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<Product>>> {
    user.require_admin()?;

    let repo = ProductRepository::new(state.db.clone());
    let products = repo
        .find_all()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(products))
}

/// GET /api/products/{id} (public)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(Json(product))
}

/// POST /api/products (admin)
pub async fn create(
    user: CurrentUser,
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    user.require_admin()?;
    payload.validate()?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .create(payload)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(product = ?product.id, name = %product.name, "Product created");
    Ok(Json(product))
}

/// PUT /api/products/{id} (admin)
///
/// Price changes only affect future orders; existing orders keep their
/// snapshotted totals.
pub async fn update(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    user.require_admin()?;
    payload.validate()?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update(&id, payload).await.map_err(|e| match e {
        crate::db::repository::RepoError::NotFound(msg) => AppError::NotFound(msg),
        other => AppError::database(other.to_string()),
    })?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - soft delete (admin)
pub async fn deactivate(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    user.require_admin()?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.deactivate(&id).await.map_err(|e| match e {
        crate::db::repository::RepoError::NotFound(msg) => AppError::NotFound(msg),
        other => AppError::database(other.to_string()),
    })?;

    tracing::info!(product = ?product.id, "Product deactivated");
    Ok(Json(product))
}
