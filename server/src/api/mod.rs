//! API route modules
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`auth`] - login and registration
//! - [`products`] - catalog browsing and admin CRUD
//! - [`accounts`] - destination bank accounts
//! - [`members`] - member administration
//! - [`orders`] - order creation, listing, payment submission, fulfillment
//! - [`payments`] - admin verification queue and decisions
//! - [`statistics`] - read-only order projections

pub mod accounts;
pub mod auth;
pub mod health;
pub mod members;
pub mod orders;
pub mod payments;
pub mod products;
pub mod statistics;

use axum::Router;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(products::router())
        .merge(accounts::router())
        .merge(members::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(statistics::router())
}
