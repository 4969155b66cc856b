//! Order API module

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/claimable", get(handler::list_claimable))
        .route("/cart/{restaurant_id}", get(handler::get_cart))
        .route("/cart/{restaurant_id}/items", post(handler::add_item))
        .route(
            "/cart/{restaurant_id}/items/{item_id}",
            delete(handler::remove_item),
        )
        .route("/cart/{restaurant_id}/place", post(handler::place))
        .route("/{order_id}/claim", post(handler::claim))
        .route("/{order_id}/status", post(handler::set_status))
}
