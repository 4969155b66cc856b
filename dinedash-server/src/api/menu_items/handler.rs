//! Menu Item API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use crate::db::repository::MenuItemRepository;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub query: Option<String>,
}

/// GET /api/menu_items/{restaurant_id} - public menu listing, with
/// optional substring search.
pub async fn list(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<AppResponse<Vec<MenuItem>>>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let restaurant = parse_restaurant(&restaurant_id)?;
    let items = match params.query.as_deref() {
        Some(q) => repo.search(&restaurant, q).await?,
        None => repo.find_by_restaurant(&restaurant).await?,
    };
    Ok(ok(items))
}

/// POST /api/menu_items/{restaurant_id} - staff only
pub async fn create(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Json<AppResponse<MenuItem>>> {
    require_staff(&user, &restaurant_id)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;

    let repo = MenuItemRepository::new(state.db.clone());
    let item = repo.create(parse_restaurant(&restaurant_id)?, payload).await?;
    Ok(ok(item))
}

/// PUT /api/menu_items/{restaurant_id}/{item_id} - staff only
pub async fn update(
    State(state): State<ServerState>,
    Path((restaurant_id, item_id)): Path<(String, String)>,
    user: CurrentUser,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<AppResponse<MenuItem>>> {
    require_staff(&user, &restaurant_id)?;
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;

    let repo = MenuItemRepository::new(state.db.clone());
    require_item_of(&repo, &item_id, &restaurant_id).await?;
    let item = repo.update(&item_id, payload).await?;
    Ok(ok(item))
}

/// DELETE /api/menu_items/{restaurant_id}/{item_id} - staff only
pub async fn delete(
    State(state): State<ServerState>,
    Path((restaurant_id, item_id)): Path<(String, String)>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<bool>>> {
    require_staff(&user, &restaurant_id)?;

    let repo = MenuItemRepository::new(state.db.clone());
    require_item_of(&repo, &item_id, &restaurant_id).await?;
    let deleted = repo.delete(&item_id).await?;
    Ok(ok(deleted))
}

fn require_staff(user: &CurrentUser, restaurant_id: &str) -> AppResult<()> {
    if !user.role.is_staff_of(restaurant_id) {
        return Err(AppError::forbidden("Not your restaurant"));
    }
    Ok(())
}

fn parse_restaurant(restaurant_id: &str) -> AppResult<surrealdb::RecordId> {
    restaurant_id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid restaurant ID: {}", restaurant_id)))
}

/// The item must exist and belong to the restaurant in the path.
async fn require_item_of(
    repo: &MenuItemRepository,
    item_id: &str,
    restaurant_id: &str,
) -> AppResult<()> {
    let item = repo
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu item not found: {}", item_id)))?;
    if item.restaurant != parse_restaurant(restaurant_id)? {
        return Err(AppError::validation(
            "Menu item belongs to a different restaurant",
        ));
    }
    Ok(())
}
