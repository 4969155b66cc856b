//! Restaurant API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/restaurants", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::search))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/distance", get(handler::distance))
}
