//! Payment API Handlers
//!
//! Card capture for placed orders. Only the last four digits of the
//! card number are stored; the amount always comes from the order's
//! frozen total, never from the client.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::OrderStatus;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, Payment, PaymentSubmit};
use crate::db::repository::PaymentRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// POST /api/payments/{order_id} - customer pays their own order
pub async fn submit(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<PaymentSubmit>,
) -> AppResult<Json<AppResponse<Payment>>> {
    let order = find_own_order(&state, &order_id, &user).await?;
    if order.status == OrderStatus::Cart || order.status == OrderStatus::Cancelled {
        return Err(AppError::validation(
            "Order is not in a payable state",
        ));
    }
    let amount = order
        .total
        .ok_or_else(|| AppError::database("Placed order without a total"))?;

    let order_record = order
        .id
        .clone()
        .ok_or_else(|| AppError::database("Order record without id"))?;
    let customer = order.customer.clone();

    let repo = PaymentRepository::new(state.db.clone());
    let payment = repo.create(order_record, customer, amount, payload).await?;
    Ok(ok(payment))
}

/// GET /api/payments/{order_id} - receipt lookup
pub async fn get_by_order(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Payment>>> {
    let order = find_own_order(&state, &order_id, &user).await?;
    let order_record = order
        .id
        .clone()
        .ok_or_else(|| AppError::database("Order record without id"))?;

    let repo = PaymentRepository::new(state.db.clone());
    let payment = repo
        .find_by_order(&order_record)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No payment for order: {}", order_id)))?;
    Ok(ok(payment))
}

/// Load the order and check it belongs to the calling customer.
async fn find_own_order(
    state: &ServerState,
    order_id: &str,
    user: &CurrentUser,
) -> AppResult<Order> {
    let order = state
        .orders
        .orders()
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order not found: {}", order_id)))?;
    let customer: surrealdb::RecordId = user
        .id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid account ID: {}", user.id)))?;
    if order.customer != customer {
        return Err(AppError::forbidden("Not your order"));
    }
    Ok(order)
}
