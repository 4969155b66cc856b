//! Payment Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Payment, PaymentSubmit};
use crate::utils::time::now_millis;
use rust_decimal::Decimal;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "payment";

#[derive(Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find payment by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Payment>> {
        let thing = parse_record_id(id)?;
        let payment: Option<Payment> = self.base.db().select(thing).await?;
        Ok(payment)
    }

    /// Payment attached to an order, if any
    pub async fn find_by_order(&self, order: &RecordId) -> RepoResult<Option<Payment>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM payment WHERE food_order = $order LIMIT 1")
            .bind(("order", order.clone()))
            .await?;
        let payments: Vec<Payment> = result.take(0)?;
        Ok(payments.into_iter().next())
    }

    /// Record a payment capture. Keeps only the last four card digits.
    pub async fn create(
        &self,
        order: RecordId,
        customer: RecordId,
        amount: Decimal,
        data: PaymentSubmit,
    ) -> RepoResult<Payment> {
        data.validate().map_err(RepoError::Validation)?;

        if self.find_by_order(&order).await?.is_some() {
            return Err(RepoError::Duplicate(
                "Order is already paid".to_string(),
            ));
        }

        let payment = Payment {
            id: None,
            card_last_four: data.card_last_four(),
            order,
            customer,
            amount_paid: amount,
            payment_method: data.payment_method,
            cardholder_name: data.cardholder_name,
            billing_address: data.billing_address,
            expiration_month: data.expiration_month,
            expiration_year: data.expiration_year,
            created_at: now_millis(),
        };

        let created: Option<Payment> = self.base.db().create(TABLE).content(payment).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create payment".to_string()))
    }
}
