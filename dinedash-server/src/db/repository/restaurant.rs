//! Restaurant Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Restaurant, RestaurantCreate, RestaurantUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "restaurant";

#[derive(Clone)]
pub struct RestaurantRepository {
    base: BaseRepository,
}

impl RestaurantRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find restaurant by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Restaurant>> {
        let thing = parse_record_id(id)?;
        let restaurant: Option<Restaurant> = self.base.db().select(thing).await?;
        Ok(restaurant)
    }

    /// Find the restaurant owned by an account
    pub async fn find_by_owner(&self, owner: &RecordId) -> RepoResult<Option<Restaurant>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM restaurant WHERE owner = $owner LIMIT 1")
            .bind(("owner", owner.clone()))
            .await?;
        let restaurants: Vec<Restaurant> = result.take(0)?;
        Ok(restaurants.into_iter().next())
    }

    /// Case-insensitive substring search over name and description.
    /// Interior whitespace in the query is collapsed to single spaces;
    /// an empty query returns nothing.
    pub async fn search(&self, query: &str) -> RepoResult<Vec<Restaurant>> {
        let needle = query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let restaurants: Vec<Restaurant> = self
            .base
            .db()
            .query(
                "SELECT * FROM restaurant \
                 WHERE string::lowercase(name) CONTAINS $needle \
                    OR string::lowercase(description) CONTAINS $needle \
                 ORDER BY name",
            )
            .bind(("needle", needle))
            .await?
            .take(0)?;
        Ok(restaurants)
    }

    /// Create a new restaurant owned by the given staff account
    pub async fn create(&self, owner: RecordId, data: RestaurantCreate) -> RepoResult<Restaurant> {
        data.hours.validate().map_err(RepoError::Validation)?;

        if self.find_by_owner(&owner).await?.is_some() {
            return Err(RepoError::Duplicate(
                "Account already owns a restaurant".to_string(),
            ));
        }

        let restaurant = Restaurant {
            id: None,
            name: data.name,
            description: data.description,
            owner,
            address: data.address,
            latitude: data.latitude,
            longitude: data.longitude,
            hours: data.hours,
        };

        let created: Option<Restaurant> = self.base.db().create(TABLE).content(restaurant).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create restaurant".to_string()))
    }

    /// Update a restaurant
    pub async fn update(&self, id: &str, data: RestaurantUpdate) -> RepoResult<Restaurant> {
        if let Some(hours) = &data.hours {
            hours.validate().map_err(RepoError::Validation)?;
        }
        let thing = parse_record_id(id)?;
        let updated: Option<Restaurant> = self.base.db().update(thing).merge(data).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Restaurant not found: {}", id)))
    }
}
