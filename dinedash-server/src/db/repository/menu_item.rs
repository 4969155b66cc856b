//! Menu Item Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "menu_item";

#[derive(Clone)]
pub struct MenuItemRepository {
    base: BaseRepository,
}

impl MenuItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all items on a restaurant's menu
    pub async fn find_by_restaurant(&self, restaurant: &RecordId) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query("SELECT * FROM menu_item WHERE restaurant = $restaurant ORDER BY name")
            .bind(("restaurant", restaurant.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Find item by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<MenuItem>> {
        let thing = parse_record_id(id)?;
        let item: Option<MenuItem> = self.base.db().select(thing).await?;
        Ok(item)
    }

    /// Case-insensitive substring search over a restaurant's menu.
    /// Empty query returns nothing.
    pub async fn search(&self, restaurant: &RecordId, query: &str) -> RepoResult<Vec<MenuItem>> {
        let needle = query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query(
                "SELECT * FROM menu_item \
                 WHERE restaurant = $restaurant \
                   AND (string::lowercase(name) CONTAINS $needle \
                     OR string::lowercase(description) CONTAINS $needle) \
                 ORDER BY name",
            )
            .bind(("restaurant", restaurant.clone()))
            .bind(("needle", needle))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Create a new menu item
    pub async fn create(&self, restaurant: RecordId, data: MenuItemCreate) -> RepoResult<MenuItem> {
        if data.price.is_sign_negative() {
            return Err(RepoError::Validation(
                "Price must not be negative".to_string(),
            ));
        }

        let item = MenuItem {
            id: None,
            name: data.name,
            description: data.description,
            price: data.price,
            restaurant,
        };

        let created: Option<MenuItem> = self.base.db().create(TABLE).content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create menu item".to_string()))
    }

    /// Update a menu item
    pub async fn update(&self, id: &str, data: MenuItemUpdate) -> RepoResult<MenuItem> {
        if let Some(price) = data.price
            && price.is_sign_negative()
        {
            return Err(RepoError::Validation(
                "Price must not be negative".to_string(),
            ));
        }
        let thing = parse_record_id(id)?;
        let updated: Option<MenuItem> = self.base.db().update(thing).merge(data).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Menu item not found: {}", id)))
    }

    /// Delete a menu item
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        let deleted: Option<MenuItem> = self.base.db().delete(thing).await?;
        Ok(deleted.is_some())
    }
}
