//! Dining Table Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "dining_table";

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active tables of a restaurant
    pub async fn find_by_restaurant(&self, restaurant: &RecordId) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query(
                "SELECT * FROM dining_table \
                 WHERE restaurant = $restaurant AND is_active = true ORDER BY name",
            )
            .bind(("restaurant", restaurant.clone()))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let thing = parse_record_id(id)?;
        let table: Option<DiningTable> = self.base.db().select(thing).await?;
        Ok(table)
    }

    /// Find table by name within a restaurant
    pub async fn find_by_name(
        &self,
        restaurant: &RecordId,
        name: &str,
    ) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM dining_table \
                 WHERE restaurant = $restaurant AND name = $name LIMIT 1",
            )
            .bind(("restaurant", restaurant.clone()))
            .bind(("name", name.to_string()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a new dining table
    pub async fn create(
        &self,
        restaurant: RecordId,
        data: DiningTableCreate,
    ) -> RepoResult<DiningTable> {
        if data.capacity == 0 {
            return Err(RepoError::Validation(
                "Capacity must be at least 1".to_string(),
            ));
        }
        if self.find_by_name(&restaurant, &data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists in this restaurant",
                data.name
            )));
        }

        let table = DiningTable {
            id: None,
            name: data.name,
            restaurant,
            capacity: data.capacity,
            is_active: true,
        };

        let created: Option<DiningTable> = self.base.db().create(TABLE).content(table).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Update a dining table
    pub async fn update(&self, id: &str, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        if let Some(capacity) = data.capacity
            && capacity == 0
        {
            return Err(RepoError::Validation(
                "Capacity must be at least 1".to_string(),
            ));
        }
        let thing = parse_record_id(id)?;
        let updated: Option<DiningTable> = self.base.db().update(thing).merge(data).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Table not found: {}", id)))
    }

    /// Soft delete a table
    pub async fn deactivate(&self, id: &str) -> RepoResult<DiningTable> {
        self.update(
            id,
            DiningTableUpdate {
                name: None,
                capacity: None,
                is_active: Some(false),
            },
        )
        .await
    }
}
