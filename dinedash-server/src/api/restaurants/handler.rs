//! Restaurant API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Restaurant, RestaurantUpdate};
use crate::db::repository::{RestaurantRepository, ReviewRepository};
use crate::geo::{self, Coordinates, GeoError};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, validate_optional_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

/// One line of the human-readable weekly schedule
#[derive(Debug, Serialize)]
pub struct HoursLine {
    pub day: String,
    pub hours: String,
}

#[derive(Debug, Serialize)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub hours_display: Vec<HoursLine>,
    pub average_rating: Option<f64>,
}

/// GET /api/restaurants?query= - substring search; no or empty query
/// returns an empty list.
pub async fn search(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<AppResponse<Vec<Restaurant>>>> {
    let repo = RestaurantRepository::new(state.db.clone());
    let restaurants = match params.query.as_deref() {
        Some(q) => repo.search(q).await?,
        None => Vec::new(),
    };
    Ok(ok(restaurants))
}

/// GET /api/restaurants/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<RestaurantDetail>>> {
    let repo = RestaurantRepository::new(state.db.clone());
    let restaurant = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Restaurant not found: {}", id)))?;

    let reviews = ReviewRepository::new(state.db.clone());
    let restaurant_id = restaurant
        .id
        .clone()
        .ok_or_else(|| AppError::database("Restaurant record without id"))?;
    let average_rating = reviews.average_rating(&restaurant_id).await?;

    let hours_display = restaurant
        .hours
        .display_lines()
        .into_iter()
        .map(|(day, hours)| HoursLine { day, hours })
        .collect();

    Ok(ok(RestaurantDetail {
        restaurant,
        hours_display,
        average_rating,
    }))
}

/// PUT /api/restaurants/{id} - staff of this restaurant only
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<RestaurantUpdate>,
) -> AppResult<Json<AppResponse<Restaurant>>> {
    if !user.role.is_staff_of(&id) {
        return Err(AppError::forbidden("Not your restaurant"));
    }
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;

    let repo = RestaurantRepository::new(state.db.clone());
    let updated = repo.update(&id, payload).await?;
    Ok(ok(updated))
}

#[derive(Debug, Deserialize)]
pub struct DistanceParams {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub miles: f64,
}

/// GET /api/restaurants/{id}/distance?address= - geocoded distance
/// from a free-form address to the restaurant.
pub async fn distance(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(params): Query<DistanceParams>,
) -> AppResult<Json<AppResponse<DistanceResponse>>> {
    let repo = RestaurantRepository::new(state.db.clone());
    let restaurant = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Restaurant not found: {}", id)))?;

    let origin = state.geocoder.geocode(&params.address).await.map_err(|e| {
        match e {
            GeoError::NoMatch(_) => AppError::validation(e.to_string()),
            other => AppError::internal(other.to_string()),
        }
    })?;

    let destination = Coordinates {
        latitude: restaurant
            .latitude
            .to_f64()
            .ok_or_else(|| AppError::database("Bad stored latitude"))?,
        longitude: restaurant
            .longitude
            .to_f64()
            .ok_or_else(|| AppError::database("Bad stored longitude"))?,
    };

    Ok(ok(DistanceResponse {
        miles: geo::distance_miles(origin, destination),
    }))
}
