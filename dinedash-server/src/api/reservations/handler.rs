//! Reservation API Handlers
//!
//! Thin HTTP layer over [`ReservationEngine`]; all workflow rules
//! (roles, opening hours, table conflicts) live in the engine.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Reservation, ReservationRequest};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// POST /api/reservations - customer requests a slot
pub async fn request(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ReservationRequest>,
) -> AppResult<Json<AppResponse<Reservation>>> {
    let reservation = state.engine.request(&user, payload).await?;
    Ok(ok(reservation))
}

/// GET /api/reservations - the calling customer's own reservations
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Reservation>>>> {
    let customer: surrealdb::RecordId = user
        .id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid account ID: {}", user.id)))?;
    let reservations = state.engine.reservations().find_by_customer(&customer).await?;
    Ok(ok(reservations))
}

/// GET /api/reservations/restaurant/{restaurant_id} - staff view
pub async fn list_restaurant(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Reservation>>>> {
    if !user.role.is_staff_of(&restaurant_id) {
        return Err(AppError::forbidden("Not your restaurant"));
    }
    let restaurant: surrealdb::RecordId = restaurant_id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid restaurant ID: {}", restaurant_id)))?;
    let reservations = state
        .engine
        .reservations()
        .find_by_restaurant(&restaurant)
        .await?;
    Ok(ok(reservations))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    /// Dining table record ID ("dining_table:abc")
    pub table: String,
}

/// POST /api/reservations/{id}/confirm - staff assigns a table
pub async fn confirm(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<ConfirmRequest>,
) -> AppResult<Json<AppResponse<Reservation>>> {
    let reservation = state.engine.confirm(&user, &id, &payload.table).await?;
    Ok(ok(reservation))
}

/// POST /api/reservations/{id}/cancel - either side backs out
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Reservation>>> {
    let reservation = state.engine.cancel(&user, &id).await?;
    Ok(ok(reservation))
}
