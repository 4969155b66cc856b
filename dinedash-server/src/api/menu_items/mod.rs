//! Menu Item API module

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu_items", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/{restaurant_id}",
            get(handler::list).post(handler::create),
        )
        .route(
            "/{restaurant_id}/{item_id}",
            put(handler::update).delete(handler::delete),
        )
}
