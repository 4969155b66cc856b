//! Reservation Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::Reservation;
use crate::utils::time::now_millis;
use shared::{ReservationStatus, Timestamp};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "reservation";

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find reservation by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Reservation>> {
        let thing = parse_record_id(id)?;
        let reservation: Option<Reservation> = self.base.db().select(thing).await?;
        Ok(reservation)
    }

    /// All reservations of a customer, newest slot first
    pub async fn find_by_customer(&self, customer: &RecordId) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query("SELECT * FROM reservation WHERE customer = $customer ORDER BY slot_start DESC")
            .bind(("customer", customer.clone()))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// All reservations of a restaurant, oldest slot first
    pub async fn find_by_restaurant(&self, restaurant: &RecordId) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation \
                 WHERE restaurant = $restaurant ORDER BY slot_start ASC",
            )
            .bind(("restaurant", restaurant.clone()))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// Confirmed reservations holding the given table whose window
    /// overlaps a slot starting at `slot_start`. Two reservations
    /// overlap when their starts are less than one window apart.
    pub async fn find_conflicting(
        &self,
        table: &RecordId,
        slot_start: Timestamp,
        window_millis: i64,
    ) -> RepoResult<Vec<Reservation>> {
        let reservations: Vec<Reservation> = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation \
                 WHERE dining_table = $table \
                   AND status = $status \
                   AND slot_start > $lo \
                   AND slot_start < $hi",
            )
            .bind(("table", table.clone()))
            .bind(("status", ReservationStatus::Confirmed))
            .bind(("lo", slot_start - window_millis))
            .bind(("hi", slot_start + window_millis))
            .await?
            .take(0)?;
        Ok(reservations)
    }

    /// Create a reservation in Requested status
    pub async fn create(
        &self,
        restaurant: RecordId,
        customer: RecordId,
        slot_start: Timestamp,
        party_size: u32,
    ) -> RepoResult<Reservation> {
        let now = now_millis();
        let reservation = Reservation {
            id: None,
            restaurant,
            customer,
            slot_start,
            party_size,
            status: ReservationStatus::Requested,
            table: None,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Reservation> =
            self.base.db().create(TABLE).content(reservation).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create reservation".to_string()))
    }

    /// Persist a status change, optionally (un)assigning a table
    pub async fn set_status(
        &self,
        id: &str,
        status: ReservationStatus,
        table: Option<RecordId>,
    ) -> RepoResult<Reservation> {
        let thing = parse_record_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $reservation \
                 SET status = $status, dining_table = $table, updated_at = $now RETURN AFTER",
            )
            .bind(("reservation", thing))
            .bind(("status", status))
            .bind(("table", table))
            .bind(("now", now_millis()))
            .await?;
        let reservations: Vec<Reservation> = result.take(0)?;
        reservations
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Reservation not found: {}", id)))
    }
}
