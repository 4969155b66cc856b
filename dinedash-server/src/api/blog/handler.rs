//! Blog API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::AccountRole;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{BlogPost, BlogPostCreate};
use crate::db::repository::BlogPostRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// GET /api/blog - public, newest first
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<BlogPost>>>> {
    let repo = BlogPostRepository::new(state.db.clone());
    let posts = repo.find_all().await?;
    Ok(ok(posts))
}

/// GET /api/blog/{id} - public
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<BlogPost>>> {
    let repo = BlogPostRepository::new(state.db.clone());
    let post = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Post not found: {}", id)))?;
    Ok(ok(post))
}

/// POST /api/blog - staff of any restaurant may publish
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<BlogPostCreate>,
) -> AppResult<Json<AppResponse<BlogPost>>> {
    if !matches!(user.role, AccountRole::Staff { .. }) {
        return Err(AppError::forbidden("Only staff can publish posts"));
    }
    let repo = BlogPostRepository::new(state.db.clone());
    let post = repo.create(payload).await?;
    Ok(ok(post))
}
