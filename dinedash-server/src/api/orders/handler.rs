//! Order API Handlers
//!
//! Cart manipulation and the delivery workflow. Status moves go
//! through one endpoint taking the target status; [`OrderService`]
//! enforces who may drive which step.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::{AccountRole, OrderStatus};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderAddItem};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// GET /api/orders - listing scoped by role: customers see their own
/// orders, staff their restaurant's, contractors their claimed ones.
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let repo = state.orders.orders();
    let orders = match &user.role {
        AccountRole::Customer => {
            let customer = parse_id(&user.id)?;
            repo.find_by_customer(&customer).await?
        }
        AccountRole::Staff { restaurant } => {
            let restaurant = parse_id(restaurant)?;
            repo.find_by_restaurant(&restaurant).await?
        }
        AccountRole::Contractor => {
            let contractor = parse_id(&user.id)?;
            repo.find_by_contractor(&contractor).await?
        }
    };
    Ok(ok(orders))
}

/// GET /api/orders/claimable - unclaimed orders in preparation
pub async fn list_claimable(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    if !user.role.is_contractor() {
        return Err(AppError::forbidden("Only contractors can claim orders"));
    }
    let orders = state.orders.orders().find_claimable().await?;
    Ok(ok(orders))
}

/// GET /api/orders/cart/{restaurant_id} - the caller's open cart,
/// which may not exist yet.
pub async fn get_cart(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Option<Order>>>> {
    let customer = parse_id(&user.id)?;
    let restaurant = parse_id(&restaurant_id)?;
    let cart = state.orders.orders().find_cart(&customer, &restaurant).await?;
    Ok(ok(cart))
}

/// POST /api/orders/cart/{restaurant_id}/items
pub async fn add_item(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<OrderAddItem>,
) -> AppResult<Json<AppResponse<Order>>> {
    let cart = state.orders.add_item(&user, &restaurant_id, payload).await?;
    Ok(ok(cart))
}

/// DELETE /api/orders/cart/{restaurant_id}/items/{item_id}
pub async fn remove_item(
    State(state): State<ServerState>,
    Path((restaurant_id, item_id)): Path<(String, String)>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Order>>> {
    let cart = state
        .orders
        .remove_item(&user, &restaurant_id, &item_id)
        .await?;
    Ok(ok(cart))
}

/// POST /api/orders/cart/{restaurant_id}/place
pub async fn place(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.orders.place(&user, &restaurant_id).await?;
    Ok(ok(order))
}

/// POST /api/orders/{order_id}/claim - contractor takes the delivery
pub async fn claim(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.orders.claim(&user, &order_id).await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// POST /api/orders/{order_id}/status - move the order to the given
/// status. Placement goes through the cart endpoint, not here.
pub async fn set_status(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<StatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = match payload.status {
        OrderStatus::Preparing => state.orders.start_preparing(&user, &order_id).await?,
        OrderStatus::PickedUp => state.orders.pick_up(&user, &order_id).await?,
        OrderStatus::Delivered => state.orders.deliver(&user, &order_id).await?,
        OrderStatus::Cancelled => state.orders.cancel(&user, &order_id).await?,
        OrderStatus::Cart | OrderStatus::Placed => {
            return Err(AppError::validation(format!(
                "Cannot move an order to {:?} through this endpoint",
                payload.status
            )));
        }
    };
    Ok(ok(order))
}

fn parse_id(id: &str) -> AppResult<surrealdb::RecordId> {
    id.parse()
        .map_err(|_| AppError::validation(format!("Invalid ID: {}", id)))
}
