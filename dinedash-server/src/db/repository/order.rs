//! Order Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Order, OrderLine};
use crate::utils::time::now_millis;
use rust_decimal::Decimal;
use shared::OrderStatus;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "food_order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = parse_record_id(id)?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// The customer's open cart for a restaurant, if any
    pub async fn find_cart(
        &self,
        customer: &RecordId,
        restaurant: &RecordId,
    ) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM food_order \
                 WHERE customer = $customer \
                   AND restaurant = $restaurant \
                   AND status = $status \
                 LIMIT 1",
            )
            .bind(("customer", customer.clone()))
            .bind(("restaurant", restaurant.clone()))
            .bind(("status", OrderStatus::Cart))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// All non-cart orders of a customer, newest first
    pub async fn find_by_customer(&self, customer: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM food_order \
                 WHERE customer = $customer AND status != $cart \
                 ORDER BY created_at DESC",
            )
            .bind(("customer", customer.clone()))
            .bind(("cart", OrderStatus::Cart))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// All non-cart orders of a restaurant, oldest first
    pub async fn find_by_restaurant(&self, restaurant: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM food_order \
                 WHERE restaurant = $restaurant AND status != $cart \
                 ORDER BY date_placed ASC",
            )
            .bind(("restaurant", restaurant.clone()))
            .bind(("cart", OrderStatus::Cart))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders a delivery contractor can claim: preparing, unclaimed
    pub async fn find_claimable(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM food_order \
                 WHERE status = $status AND (contractor = NONE OR contractor = NULL) \
                 ORDER BY date_placed ASC",
            )
            .bind(("status", OrderStatus::Preparing))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders claimed by a contractor that are still in flight
    pub async fn find_by_contractor(&self, contractor: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM food_order \
                 WHERE contractor = $contractor \
                 ORDER BY date_placed ASC",
            )
            .bind(("contractor", contractor.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Create an empty cart
    pub async fn create_cart(
        &self,
        customer: RecordId,
        restaurant: RecordId,
    ) -> RepoResult<Order> {
        let now = now_millis();
        let order = Order {
            id: None,
            restaurant,
            customer,
            lines: Vec::new(),
            status: OrderStatus::Cart,
            contractor: None,
            total: None,
            date_placed: None,
            date_delivered: None,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Replace the cart's line items
    pub async fn set_lines(&self, id: &str, lines: Vec<OrderLine>) -> RepoResult<Order> {
        let thing = parse_record_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $order SET lines = $lines, updated_at = $now RETURN AFTER")
            .bind(("order", thing))
            .bind(("lines", lines))
            .bind(("now", now_millis()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order not found: {}", id)))
    }

    /// Freeze the cart into a placed order
    pub async fn mark_placed(&self, id: &str, total: Decimal) -> RepoResult<Order> {
        let thing = parse_record_id(id)?;
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $order \
                 SET status = $status, total = $total, date_placed = $now, updated_at = $now \
                 RETURN AFTER",
            )
            .bind(("order", thing))
            .bind(("status", OrderStatus::Placed))
            .bind(("total", total))
            .bind(("now", now))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order not found: {}", id)))
    }

    /// Assign a contractor to an unclaimed preparing order. The write
    /// carries the unclaimed condition, so of two racing claims only
    /// one updates a row; the loser gets None.
    pub async fn assign_contractor(
        &self,
        id: &str,
        contractor: RecordId,
    ) -> RepoResult<Option<Order>> {
        let thing = parse_record_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $order \
                 SET contractor = $contractor, updated_at = $now \
                 WHERE status = $status AND (contractor = NONE OR contractor = NULL) \
                 RETURN AFTER",
            )
            .bind(("order", thing))
            .bind(("contractor", contractor))
            .bind(("status", OrderStatus::Preparing))
            .bind(("now", now_millis()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Persist a status change; sets delivery time as the lifecycle
    /// requires.
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> RepoResult<Order> {
        let thing = parse_record_id(id)?;
        let delivered_at = (status == OrderStatus::Delivered).then(now_millis);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $order \
                 SET status = $status, \
                     date_delivered = $delivered ?? date_delivered, \
                     updated_at = $now \
                 RETURN AFTER",
            )
            .bind(("order", thing))
            .bind(("status", status))
            .bind(("delivered", delivered_at))
            .bind(("now", now_millis()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order not found: {}", id)))
    }
}
