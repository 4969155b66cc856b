//! ReservationEngine - reservation command processing and event generation
//!
//! # Command Flow
//!
//! ```text
//! request / confirm / cancel
//!     ├─ 1. Load current snapshot from the database
//!     ├─ 2. Check actor permission
//!     ├─ 3. Validate the transition (state machine + business rules)
//!     ├─ 4. Persist the new state
//!     └─ 5. Broadcast the workflow event
//! ```
//!
//! Confirm and cancel run their status re-check and write under a
//! single mutex: of two racing confirms for the same table exactly one
//! succeeds, and a confirm can never overwrite a committed
//! cancellation. This is a single-process guarantee.

use chrono::{Datelike, Duration};
use chrono_tz::Tz;
use shared::{ActorSide, ReservationStatus, WorkflowEvent, WorkflowEventKind};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use tokio::sync::{Mutex, broadcast};

use super::error::{WorkflowError, WorkflowResult};
use crate::auth::CurrentUser;
use crate::db::models::{Reservation, ReservationRequest};
use crate::db::repository::{DiningTableRepository, ReservationRepository, RestaurantRepository};
use crate::utils::time::millis_to_local;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Reservation command processor
pub struct ReservationEngine {
    reservations: ReservationRepository,
    restaurants: RestaurantRepository,
    tables: DiningTableRepository,
    /// Length of the slot a confirmed table is held for
    window: Duration,
    /// Business timezone for opening-hours checks
    tz: Tz,
    event_tx: broadcast::Sender<WorkflowEvent>,
    /// Serializes status re-check + write for confirm and cancel
    transition_lock: Mutex<()>,
}

impl ReservationEngine {
    pub fn new(db: Surreal<Db>, window: Duration, tz: Tz) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            reservations: ReservationRepository::new(db.clone()),
            restaurants: RestaurantRepository::new(db.clone()),
            tables: DiningTableRepository::new(db),
            window,
            tz,
            event_tx,
            transition_lock: Mutex::new(()),
        }
    }

    /// Subscribe to workflow events
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.event_tx.subscribe()
    }

    pub fn event_sender(&self) -> broadcast::Sender<WorkflowEvent> {
        self.event_tx.clone()
    }

    /// Repository access for read-only listing endpoints
    pub fn reservations(&self) -> &ReservationRepository {
        &self.reservations
    }

    /// Customer requests a slot. The reservation starts in Requested
    /// status with no table.
    pub async fn request(
        &self,
        actor: &CurrentUser,
        req: ReservationRequest,
    ) -> WorkflowResult<Reservation> {
        if !actor.role.is_customer() {
            return Err(WorkflowError::Permission(
                "Only customers can request reservations".to_string(),
            ));
        }
        if req.party_size == 0 {
            return Err(WorkflowError::Validation(
                "Party size must be at least 1".to_string(),
            ));
        }

        let restaurant = self
            .restaurants
            .find_by_id(&req.restaurant)
            .await?
            .ok_or_else(|| {
                WorkflowError::NotFound(format!("Restaurant not found: {}", req.restaurant))
            })?;

        self.check_open_at(&restaurant.hours, req.slot_start)?;

        let customer: RecordId = actor
            .id
            .parse()
            .map_err(|_| WorkflowError::Validation(format!("Invalid account ID: {}", actor.id)))?;
        let restaurant_id = restaurant
            .id
            .clone()
            .ok_or_else(|| WorkflowError::Database("Restaurant record without id".to_string()))?;

        let reservation = self
            .reservations
            .create(restaurant_id, customer, req.slot_start, req.party_size)
            .await?;

        self.emit(WorkflowEvent::new(
            actor.id.clone(),
            WorkflowEventKind::ReservationRequested {
                reservation_id: id_string(&reservation.id),
                restaurant_id: reservation.restaurant.to_string(),
                customer_id: reservation.customer.to_string(),
                slot_start: reservation.slot_start,
                party_size: reservation.party_size,
            },
        ));

        Ok(reservation)
    }

    /// Staff confirms a requested reservation onto a concrete table.
    pub async fn confirm(
        &self,
        actor: &CurrentUser,
        reservation_id: &str,
        table_id: &str,
    ) -> WorkflowResult<Reservation> {
        let reservation = self.load(reservation_id).await?;
        let restaurant_key = reservation.restaurant.to_string();
        if !actor.role.is_staff_of(&restaurant_key) {
            return Err(WorkflowError::Permission(
                "Only staff of this restaurant can confirm reservations".to_string(),
            ));
        }

        let table = self
            .tables
            .find_by_id(table_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Table not found: {}", table_id)))?;
        if table.restaurant != reservation.restaurant {
            return Err(WorkflowError::Validation(
                "Table belongs to a different restaurant".to_string(),
            ));
        }
        if !table.is_active {
            return Err(WorkflowError::Validation(
                "Table is not active".to_string(),
            ));
        }
        if table.capacity < reservation.party_size {
            return Err(WorkflowError::Conflict(format!(
                "Table '{}' seats {}, party of {} does not fit",
                table.name, table.capacity, reservation.party_size
            )));
        }
        let table_record = table
            .id
            .clone()
            .ok_or_else(|| WorkflowError::Database("Table record without id".to_string()))?;

        // Availability check and assignment must not interleave with a
        // racing confirm or cancel.
        let confirmed = {
            let _guard = self.transition_lock.lock().await;

            let current = self.load(reservation_id).await?;
            if !current.status.can_transition_to(ReservationStatus::Confirmed) {
                return Err(WorkflowError::Conflict(format!(
                    "Reservation is {:?}, only Requested reservations can be confirmed",
                    current.status
                )));
            }

            let conflicts = self
                .reservations
                .find_conflicting(
                    &table_record,
                    current.slot_start,
                    self.window.num_milliseconds(),
                )
                .await?;
            if !conflicts.is_empty() {
                return Err(WorkflowError::Conflict(format!(
                    "Table '{}' is already reserved in that window",
                    table.name
                )));
            }

            self.reservations
                .set_status(
                    reservation_id,
                    ReservationStatus::Confirmed,
                    Some(table_record.clone()),
                )
                .await?
        };

        self.emit(WorkflowEvent::new(
            actor.id.clone(),
            WorkflowEventKind::ReservationConfirmed {
                reservation_id: id_string(&confirmed.id),
                restaurant_id: confirmed.restaurant.to_string(),
                customer_id: confirmed.customer.to_string(),
                table_id: table_record.to_string(),
                table_name: table.name,
                slot_start: confirmed.slot_start,
            },
        ));

        Ok(confirmed)
    }

    /// Cancel a reservation. Allowed to the owning customer and to
    /// staff of the restaurant; cancelling twice is a conflict.
    pub async fn cancel(
        &self,
        actor: &CurrentUser,
        reservation_id: &str,
    ) -> WorkflowResult<Reservation> {
        let reservation = self.load(reservation_id).await?;

        let cancelled_by = if reservation.customer.to_string() == actor.id {
            ActorSide::Customer
        } else if actor.role.is_staff_of(&reservation.restaurant.to_string()) {
            ActorSide::Staff
        } else {
            return Err(WorkflowError::Permission(
                "Not your reservation".to_string(),
            ));
        };

        // Shares the transition lock with confirm: once a cancellation
        // commits, a racing confirm must not write Confirmed over it.
        let (cancelled, previous_status, released_table_id) = {
            let _guard = self.transition_lock.lock().await;

            let current = self.load(reservation_id).await?;
            if !current
                .status
                .can_transition_to(ReservationStatus::Cancelled)
            {
                return Err(WorkflowError::Conflict(
                    "Reservation is already cancelled".to_string(),
                ));
            }

            let previous_status = current.status;
            let released_table_id = current.table.as_ref().map(|t| t.to_string());

            let cancelled = self
                .reservations
                .set_status(reservation_id, ReservationStatus::Cancelled, None)
                .await?;
            (cancelled, previous_status, released_table_id)
        };

        self.emit(WorkflowEvent::new(
            actor.id.clone(),
            WorkflowEventKind::ReservationCancelled {
                reservation_id: id_string(&cancelled.id),
                restaurant_id: cancelled.restaurant.to_string(),
                customer_id: cancelled.customer.to_string(),
                cancelled_by,
                released_table_id,
                previous_status,
            },
        ));

        Ok(cancelled)
    }

    async fn load(&self, reservation_id: &str) -> WorkflowResult<Reservation> {
        self.reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| {
                WorkflowError::NotFound(format!("Reservation not found: {}", reservation_id))
            })
    }

    /// The slot start must fall within the restaurant's local opening
    /// hours for that weekday.
    fn check_open_at(
        &self,
        hours: &crate::db::models::WeeklyHours,
        slot_start: i64,
    ) -> WorkflowResult<()> {
        let local = millis_to_local(slot_start, self.tz)
            .ok_or_else(|| WorkflowError::Validation("Invalid slot timestamp".to_string()))?;
        let day = hours.for_weekday(local.weekday()).ok_or_else(|| {
            WorkflowError::Validation("Restaurant is closed on that day".to_string())
        })?;
        if !day.contains(local.time()) {
            return Err(WorkflowError::Validation(
                "Requested slot is outside opening hours".to_string(),
            ));
        }
        Ok(())
    }

    fn emit(&self, event: WorkflowEvent) {
        // send only fails when nobody is subscribed
        if self.event_tx.send(event).is_err() {
            tracing::debug!("No workflow event subscribers");
        }
    }
}

fn id_string(id: &Option<RecordId>) -> String {
    id.as_ref().map(|id| id.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{
        DayHours, DiningTableCreate, RestaurantCreate, WeeklyHours,
    };
    use crate::db::repository::AccountRepository;
    use chrono::NaiveTime;
    use rust_decimal::Decimal;
    use shared::AccountRole;
    use std::sync::Arc;

    // 2024-06-01 18:00:00 UTC, a Saturday
    const SLOT: i64 = 1_717_264_800_000;
    const HOUR: i64 = 3_600_000;

    fn all_day() -> WeeklyHours {
        let day = DayHours {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            close: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
        };
        WeeklyHours {
            sunday: Some(day.clone()),
            monday: Some(day.clone()),
            tuesday: Some(day.clone()),
            wednesday: Some(day.clone()),
            thursday: Some(day.clone()),
            friday: Some(day.clone()),
            saturday: Some(day),
        }
    }

    struct Fixture {
        engine: Arc<ReservationEngine>,
        customer: CurrentUser,
        staff: CurrentUser,
        restaurant_id: String,
        table_id: String,
    }

    async fn setup() -> Fixture {
        setup_with_hours(all_day()).await
    }

    async fn setup_with_hours(hours: WeeklyHours) -> Fixture {
        let db = DbService::new_in_memory().await.unwrap().db;
        let accounts = AccountRepository::new(db.clone());
        let restaurants = RestaurantRepository::new(db.clone());
        let tables = DiningTableRepository::new(db.clone());

        let customer_account = accounts
            .create("c@example.com", "Customer", "pass123", AccountRole::Customer)
            .await
            .unwrap();
        let staff_account = accounts
            .create("s@example.com", "Staff", "pass123", AccountRole::Customer)
            .await
            .unwrap();

        let restaurant = restaurants
            .create(
                staff_account.id.clone().unwrap(),
                RestaurantCreate {
                    name: "Trattoria".into(),
                    description: "Pasta".into(),
                    address: "1 Main St".into(),
                    latitude: Decimal::new(40, 0),
                    longitude: Decimal::new(-3, 0),
                    hours,
                },
            )
            .await
            .unwrap();
        let restaurant_id = restaurant.id.clone().unwrap().to_string();

        let table = tables
            .create(
                restaurant.id.clone().unwrap(),
                DiningTableCreate {
                    name: "T1".into(),
                    capacity: 4,
                },
            )
            .await
            .unwrap();

        let customer = CurrentUser {
            id: customer_account.id.unwrap().to_string(),
            email: "c@example.com".into(),
            display_name: "Customer".into(),
            role: AccountRole::Customer,
        };
        let staff = CurrentUser {
            id: staff_account.id.unwrap().to_string(),
            email: "s@example.com".into(),
            display_name: "Staff".into(),
            role: AccountRole::Staff {
                restaurant: restaurant_id.clone(),
            },
        };

        Fixture {
            engine: Arc::new(ReservationEngine::new(
                db,
                Duration::minutes(90),
                chrono_tz::UTC,
            )),
            customer,
            staff,
            restaurant_id,
            table_id: table.id.unwrap().to_string(),
        }
    }

    fn request_at(f: &Fixture, slot: i64, party: u32) -> ReservationRequest {
        ReservationRequest {
            restaurant: f.restaurant_id.clone(),
            slot_start: slot,
            party_size: party,
        }
    }

    #[tokio::test]
    async fn request_creates_requested_reservation() {
        let f = setup().await;
        let mut rx = f.engine.subscribe();

        let r = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap();
        assert_eq!(r.status, ReservationStatus::Requested);
        assert!(r.table.is_none());

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event.kind,
            WorkflowEventKind::ReservationRequested { party_size: 2, .. }
        ));
    }

    #[tokio::test]
    async fn request_rejects_empty_party() {
        let f = setup().await;
        let err = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn request_rejected_by_staff_actor() {
        let f = setup().await;
        let err = f
            .engine
            .request(&f.staff, request_at(&f, SLOT, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
    }

    #[tokio::test]
    async fn request_outside_opening_hours_rejected() {
        let f = setup().await;
        // 03:00 UTC, before opening
        let err = f
            .engine
            .request(&f.customer, request_at(&f, SLOT - 15 * HOUR, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn request_on_closed_day_rejected() {
        let mut hours = all_day();
        hours.saturday = None;
        let f = setup_with_hours(hours).await;
        let err = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn confirm_assigns_table() {
        let f = setup().await;
        let r = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap();
        let mut rx = f.engine.subscribe();

        let confirmed = f
            .engine
            .confirm(&f.staff, &r.id.unwrap().to_string(), &f.table_id)
            .await
            .unwrap();
        assert_eq!(confirmed.status, ReservationStatus::Confirmed);
        assert_eq!(confirmed.table.unwrap().to_string(), f.table_id);

        let event = rx.recv().await.unwrap();
        match event.kind {
            WorkflowEventKind::ReservationConfirmed { table_name, .. } => {
                assert_eq!(table_name, "T1");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn confirm_by_customer_rejected() {
        let f = setup().await;
        let r = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap();
        let err = f
            .engine
            .confirm(&f.customer, &r.id.unwrap().to_string(), &f.table_id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
    }

    #[tokio::test]
    async fn confirm_small_table_rejected() {
        let f = setup().await;
        let r = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 6))
            .await
            .unwrap();
        let err = f
            .engine
            .confirm(&f.staff, &r.id.unwrap().to_string(), &f.table_id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn confirm_overlapping_window_rejected() {
        let f = setup().await;
        let r1 = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap();
        f.engine
            .confirm(&f.staff, &r1.id.unwrap().to_string(), &f.table_id)
            .await
            .unwrap();

        // One hour later: inside the 90 minute window
        let r2 = f
            .engine
            .request(&f.customer, request_at(&f, SLOT + HOUR, 2))
            .await
            .unwrap();
        let err = f
            .engine
            .confirm(&f.staff, &r2.id.unwrap().to_string(), &f.table_id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));

        // Three hours later: windows disjoint, same table is fine
        let r3 = f
            .engine
            .request(&f.customer, request_at(&f, SLOT + 3 * HOUR, 2))
            .await
            .unwrap();
        f.engine
            .confirm(&f.staff, &r3.id.unwrap().to_string(), &f.table_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn racing_confirms_one_wins() {
        let f = setup().await;
        let r1 = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap();
        let r2 = f
            .engine
            .request(&f.customer, request_at(&f, SLOT + HOUR, 2))
            .await
            .unwrap();
        let id1 = r1.id.unwrap().to_string();
        let id2 = r2.id.unwrap().to_string();

        let (a, b) = tokio::join!(
            f.engine.confirm(&f.staff, &id1, &f.table_id),
            f.engine.confirm(&f.staff, &id2, &f.table_id),
        );
        let wins = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn confirm_twice_conflicts() {
        let f = setup().await;
        let r = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap();
        let id = r.id.unwrap().to_string();
        f.engine.confirm(&f.staff, &id, &f.table_id).await.unwrap();
        let err = f
            .engine
            .confirm(&f.staff, &id, &f.table_id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn cancel_confirmed_releases_table() {
        let f = setup().await;
        let r = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap();
        let id = r.id.unwrap().to_string();
        f.engine.confirm(&f.staff, &id, &f.table_id).await.unwrap();
        let mut rx = f.engine.subscribe();

        let cancelled = f.engine.cancel(&f.customer, &id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert!(cancelled.table.is_none());

        let event = rx.recv().await.unwrap();
        match event.kind {
            WorkflowEventKind::ReservationCancelled {
                cancelled_by,
                released_table_id,
                previous_status,
                ..
            } => {
                assert_eq!(cancelled_by, ActorSide::Customer);
                assert_eq!(released_table_id.unwrap(), f.table_id);
                assert_eq!(previous_status, ReservationStatus::Confirmed);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        // Table is free again for the same window
        let again = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap();
        f.engine
            .confirm(&f.staff, &again.id.unwrap().to_string(), &f.table_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancel_racing_confirm_stays_cancelled() {
        let f = setup().await;
        const DAY: i64 = 24 * HOUR;
        for round in 0..8i64 {
            let r = f
                .engine
                .request(&f.customer, request_at(&f, SLOT + round * DAY, 2))
                .await
                .unwrap();
            let id = r.id.unwrap().to_string();

            let (cancelled, confirmed) = tokio::join!(
                f.engine.cancel(&f.customer, &id),
                f.engine.confirm(&f.staff, &id, &f.table_id),
            );

            // Both orderings are fine, but Cancelled is terminal: once
            // the cancel commits the reservation must stay Cancelled.
            cancelled.unwrap();
            let stored = f
                .engine
                .reservations()
                .find_by_id(&id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored.status, ReservationStatus::Cancelled);
            if confirmed.is_err() {
                assert!(matches!(confirmed.unwrap_err(), WorkflowError::Conflict(_)));
            }
        }
    }

    #[tokio::test]
    async fn cancel_twice_conflicts() {
        let f = setup().await;
        let r = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap();
        let id = r.id.unwrap().to_string();
        f.engine.cancel(&f.customer, &id).await.unwrap();
        let err = f.engine.cancel(&f.customer, &id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn cancel_by_stranger_rejected() {
        let f = setup().await;
        let r = f
            .engine
            .request(&f.customer, request_at(&f, SLOT, 2))
            .await
            .unwrap();
        let stranger = CurrentUser {
            id: "account:someone_else".into(),
            email: "x@example.com".into(),
            display_name: "X".into(),
            role: AccountRole::Customer,
        };
        let err = f
            .engine
            .cancel(&stranger, &r.id.unwrap().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
    }
}
