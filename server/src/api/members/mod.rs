//! Member API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/members", member_routes())
}

fn member_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/me", get(handler::me))
        .route("/{id}", get(handler::get_by_id).delete(handler::deactivate))
}
