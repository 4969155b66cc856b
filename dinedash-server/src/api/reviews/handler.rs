//! Review API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Review, ReviewCreate};
use crate::db::repository::{RestaurantRepository, ReviewRepository};
use crate::utils::validation::{MAX_REVIEW_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct ReviewList {
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
}

/// GET /api/reviews/{restaurant_id} - public, newest first
pub async fn list(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
) -> AppResult<Json<AppResponse<ReviewList>>> {
    let restaurant = parse_restaurant(&restaurant_id)?;
    let repo = ReviewRepository::new(state.db.clone());
    let reviews = repo.find_by_restaurant(&restaurant).await?;
    let average_rating = repo.average_rating(&restaurant).await?;
    Ok(ok(ReviewList {
        reviews,
        average_rating,
    }))
}

/// POST /api/reviews/{restaurant_id} - customers only, once per
/// restaurant.
pub async fn create(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<Json<AppResponse<Review>>> {
    if !user.role.is_customer() {
        return Err(AppError::forbidden("Only customers can post reviews"));
    }
    validate_required_text(&payload.description, "description", MAX_REVIEW_LEN)?;

    let restaurants = RestaurantRepository::new(state.db.clone());
    restaurants
        .find_by_id(&restaurant_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Restaurant not found: {}", restaurant_id)))?;

    let customer = user
        .id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid account ID: {}", user.id)))?;
    let repo = ReviewRepository::new(state.db.clone());
    let review = repo
        .create(customer, parse_restaurant(&restaurant_id)?, payload)
        .await?;
    Ok(ok(review))
}

fn parse_restaurant(restaurant_id: &str) -> AppResult<surrealdb::RecordId> {
    restaurant_id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid restaurant ID: {}", restaurant_id)))
}
