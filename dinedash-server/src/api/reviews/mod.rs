//! Review API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reviews", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route(
        "/{restaurant_id}",
        get(handler::list).post(handler::create),
    )
}
