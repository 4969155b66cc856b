//! Dining Table API Handlers
//!
//! All table management is staff-only and scoped to the staff
//! member's own restaurant. Deletion is a soft deactivate so past
//! reservations keep pointing at a real record.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use crate::db::repository::DiningTableRepository;
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// GET /api/tables/{restaurant_id} - active tables
pub async fn list(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<DiningTable>>>> {
    require_staff(&user, &restaurant_id)?;
    let repo = DiningTableRepository::new(state.db.clone());
    let restaurant = restaurant_id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid restaurant ID: {}", restaurant_id)))?;
    let tables = repo.find_by_restaurant(&restaurant).await?;
    Ok(ok(tables))
}

/// GET /api/tables/{restaurant_id}/{table_id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path((restaurant_id, table_id)): Path<(String, String)>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    require_staff(&user, &restaurant_id)?;
    let repo = DiningTableRepository::new(state.db.clone());
    let table = find_table_of(&repo, &table_id, &restaurant_id).await?;
    Ok(ok(table))
}

/// POST /api/tables/{restaurant_id} - staff only
pub async fn create(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    require_staff(&user, &restaurant_id)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let repo = DiningTableRepository::new(state.db.clone());
    let restaurant = restaurant_id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid restaurant ID: {}", restaurant_id)))?;
    let table = repo.create(restaurant, payload).await?;
    Ok(ok(table))
}

/// PUT /api/tables/{restaurant_id}/{table_id} - staff only
pub async fn update(
    State(state): State<ServerState>,
    Path((restaurant_id, table_id)): Path<(String, String)>,
    user: CurrentUser,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    require_staff(&user, &restaurant_id)?;
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;

    let repo = DiningTableRepository::new(state.db.clone());
    find_table_of(&repo, &table_id, &restaurant_id).await?;
    let table = repo.update(&table_id, payload).await?;
    Ok(ok(table))
}

/// DELETE /api/tables/{restaurant_id}/{table_id} - soft deactivate
pub async fn deactivate(
    State(state): State<ServerState>,
    Path((restaurant_id, table_id)): Path<(String, String)>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    require_staff(&user, &restaurant_id)?;

    let repo = DiningTableRepository::new(state.db.clone());
    find_table_of(&repo, &table_id, &restaurant_id).await?;
    let table = repo.deactivate(&table_id).await?;
    Ok(ok(table))
}

fn require_staff(user: &CurrentUser, restaurant_id: &str) -> AppResult<()> {
    if !user.role.is_staff_of(restaurant_id) {
        return Err(AppError::forbidden("Not your restaurant"));
    }
    Ok(())
}

async fn find_table_of(
    repo: &DiningTableRepository,
    table_id: &str,
    restaurant_id: &str,
) -> AppResult<DiningTable> {
    let table = repo
        .find_by_id(table_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table not found: {}", table_id)))?;
    let restaurant: surrealdb::RecordId = restaurant_id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid restaurant ID: {}", restaurant_id)))?;
    if table.restaurant != restaurant {
        return Err(AppError::validation(
            "Table belongs to a different restaurant",
        ));
    }
    Ok(table)
}
