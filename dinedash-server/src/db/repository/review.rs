//! Review Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Review, ReviewCreate};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "review";

#[derive(Clone)]
pub struct ReviewRepository {
    base: BaseRepository,
}

impl ReviewRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All reviews of a restaurant, newest first
    pub async fn find_by_restaurant(&self, restaurant: &RecordId) -> RepoResult<Vec<Review>> {
        let reviews: Vec<Review> = self
            .base
            .db()
            .query("SELECT * FROM review WHERE restaurant = $restaurant ORDER BY created_at DESC")
            .bind(("restaurant", restaurant.clone()))
            .await?
            .take(0)?;
        Ok(reviews)
    }

    /// Find review by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Review>> {
        let thing = parse_record_id(id)?;
        let review: Option<Review> = self.base.db().select(thing).await?;
        Ok(review)
    }

    /// The customer's existing review of a restaurant, if any
    pub async fn find_by_customer_and_restaurant(
        &self,
        customer: &RecordId,
        restaurant: &RecordId,
    ) -> RepoResult<Option<Review>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM review \
                 WHERE customer = $customer AND restaurant = $restaurant LIMIT 1",
            )
            .bind(("customer", customer.clone()))
            .bind(("restaurant", restaurant.clone()))
            .await?;
        let reviews: Vec<Review> = result.take(0)?;
        Ok(reviews.into_iter().next())
    }

    /// Mean rating across a restaurant's reviews, None when unreviewed
    pub async fn average_rating(&self, restaurant: &RecordId) -> RepoResult<Option<f64>> {
        let reviews = self.find_by_restaurant(restaurant).await?;
        if reviews.is_empty() {
            return Ok(None);
        }
        let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        Ok(Some(f64::from(sum) / reviews.len() as f64))
    }

    /// Create a review. One per customer per restaurant.
    pub async fn create(
        &self,
        customer: RecordId,
        restaurant: RecordId,
        data: ReviewCreate,
    ) -> RepoResult<Review> {
        if !(1..=5).contains(&data.rating) {
            return Err(RepoError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        if self
            .find_by_customer_and_restaurant(&customer, &restaurant)
            .await?
            .is_some()
        {
            return Err(RepoError::Duplicate(
                "You have already reviewed this restaurant".to_string(),
            ));
        }

        let review = Review {
            id: None,
            customer,
            restaurant,
            rating: data.rating,
            description: data.description,
            created_at: now_millis(),
        };

        let created: Option<Review> = self.base.db().create(TABLE).content(review).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create review".to_string()))
    }

    /// Delete a review
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        let deleted: Option<Review> = self.base.db().delete(thing).await?;
        Ok(deleted.is_some())
    }
}
