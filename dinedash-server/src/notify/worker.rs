//! Notify worker - consumes routed workflow events and sends mail
//!
//! Recipient rule: the party that did not act gets notified. A request
//! mails the restaurant owner; a confirmation mails the customer; a
//! cancellation mails the other side.

use chrono::TimeZone;
use chrono_tz::Tz;
use shared::{ActorSide, WorkflowEvent, WorkflowEventKind};
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::mpsc;

use super::Notifier;
use crate::db::repository::{AccountRepository, RestaurantRepository};

pub struct NotifyWorker {
    accounts: AccountRepository,
    restaurants: RestaurantRepository,
    notifier: Arc<dyn Notifier>,
    tz: Tz,
}

impl NotifyWorker {
    pub fn new(db: Surreal<Db>, notifier: Arc<dyn Notifier>, tz: Tz) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            restaurants: RestaurantRepository::new(db),
            notifier,
            tz,
        }
    }

    /// Consume events until the channel closes.
    pub async fn run(self, mut rx: mpsc::Receiver<Arc<WorkflowEvent>>) {
        tracing::info!("Notify worker started");
        while let Some(event) = rx.recv().await {
            if let Err(e) = self.handle(&event).await {
                // Never propagated: the transition already committed
                tracing::warn!(
                    target: "notify",
                    event_id = %event.event_id,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
        tracing::info!("Notify worker stopping, channel closed");
    }

    async fn handle(&self, event: &WorkflowEvent) -> anyhow::Result<()> {
        let Some((recipient, subject, body)) = self.compose(event).await? else {
            return Ok(());
        };
        self.notifier.notify(&recipient, &subject, &body).await?;
        Ok(())
    }

    /// Resolve recipient address and message text, None when the event
    /// kind carries no notification.
    async fn compose(
        &self,
        event: &WorkflowEvent,
    ) -> anyhow::Result<Option<(String, String, String)>> {
        match &event.kind {
            WorkflowEventKind::ReservationRequested {
                restaurant_id,
                slot_start,
                party_size,
                ..
            } => {
                let Some(email) = self.owner_email(restaurant_id).await? else {
                    return Ok(None);
                };
                Ok(Some((
                    email,
                    "New reservation request".to_string(),
                    format!(
                        "A party of {} requested a table for {}.",
                        party_size,
                        self.format_slot(*slot_start)
                    ),
                )))
            }
            WorkflowEventKind::ReservationConfirmed {
                customer_id,
                table_name,
                slot_start,
                ..
            } => {
                let Some(email) = self.account_email(customer_id).await? else {
                    return Ok(None);
                };
                Ok(Some((
                    email,
                    "Reservation confirmed".to_string(),
                    format!(
                        "Your reservation for {} is confirmed at table {}.",
                        self.format_slot(*slot_start),
                        table_name
                    ),
                )))
            }
            WorkflowEventKind::ReservationCancelled {
                restaurant_id,
                customer_id,
                cancelled_by,
                ..
            } => {
                let email = match cancelled_by {
                    ActorSide::Customer => self.owner_email(restaurant_id).await?,
                    ActorSide::Staff => self.account_email(customer_id).await?,
                };
                let Some(email) = email else {
                    return Ok(None);
                };
                Ok(Some((
                    email,
                    "Reservation cancelled".to_string(),
                    "The reservation has been cancelled.".to_string(),
                )))
            }
            // Order refreshes go to presentation sessions, not mail
            WorkflowEventKind::OrderStatusChanged { .. } => Ok(None),
        }
    }

    async fn owner_email(&self, restaurant_id: &str) -> anyhow::Result<Option<String>> {
        let Some(restaurant) = self.restaurants.find_by_id(restaurant_id).await? else {
            return Ok(None);
        };
        self.account_email(&restaurant.owner.to_string()).await
    }

    async fn account_email(&self, account_id: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .accounts
            .find_by_id(account_id)
            .await?
            .map(|a| a.email))
    }

    fn format_slot(&self, millis: i64) -> String {
        self.tz
            .timestamp_millis_opt(millis)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| millis.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotifyError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(
            &self,
            recipient: &str,
            subject: &str,
            _body: &str,
        ) -> Result<(), NotifyError> {
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), subject.to_string()));
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, _: &str, _: &str, _: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Setup("boom".to_string()))
        }
    }

    async fn fixture(db: Surreal<Db>) -> (String, String) {
        use crate::db::models::{RestaurantCreate, WeeklyHours};
        use rust_decimal::Decimal;
        use shared::AccountRole;

        let accounts = AccountRepository::new(db.clone());
        let restaurants = RestaurantRepository::new(db);
        let owner = accounts
            .create("owner@example.com", "Owner", "pass123", AccountRole::Customer)
            .await
            .unwrap();
        let restaurant = restaurants
            .create(
                owner.id.unwrap(),
                RestaurantCreate {
                    name: "Bistro".into(),
                    description: "Bistro".into(),
                    address: "3 High St".into(),
                    latitude: Decimal::ZERO,
                    longitude: Decimal::ZERO,
                    hours: WeeklyHours::default(),
                },
            )
            .await
            .unwrap();
        let customer = accounts
            .create("guest@example.com", "Guest", "pass123", AccountRole::Customer)
            .await
            .unwrap();
        (
            restaurant.id.unwrap().to_string(),
            customer.id.unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn request_notifies_restaurant_owner() {
        let db = crate::db::DbService::new_in_memory().await.unwrap().db;
        let (restaurant_id, customer_id) = fixture(db.clone()).await;
        let notifier = Arc::new(RecordingNotifier {
            sent: Mutex::new(Vec::new()),
        });
        let worker = NotifyWorker::new(db, notifier.clone(), chrono_tz::UTC);

        let event = WorkflowEvent::new(
            customer_id.clone(),
            WorkflowEventKind::ReservationRequested {
                reservation_id: "reservation:r1".into(),
                restaurant_id,
                customer_id,
                slot_start: 1_717_264_800_000,
                party_size: 2,
            },
        );
        worker.handle(&event).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "owner@example.com");
        assert_eq!(sent[0].1, "New reservation request");
    }

    #[tokio::test]
    async fn staff_cancellation_notifies_customer() {
        let db = crate::db::DbService::new_in_memory().await.unwrap().db;
        let (restaurant_id, customer_id) = fixture(db.clone()).await;
        let notifier = Arc::new(RecordingNotifier {
            sent: Mutex::new(Vec::new()),
        });
        let worker = NotifyWorker::new(db, notifier.clone(), chrono_tz::UTC);

        let event = WorkflowEvent::new(
            "account:staff",
            WorkflowEventKind::ReservationCancelled {
                reservation_id: "reservation:r1".into(),
                restaurant_id,
                customer_id,
                cancelled_by: ActorSide::Staff,
                released_table_id: None,
                previous_status: shared::ReservationStatus::Requested,
            },
        );
        worker.handle(&event).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent[0].0, "guest@example.com");
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed_by_run_loop() {
        let db = crate::db::DbService::new_in_memory().await.unwrap().db;
        let (restaurant_id, customer_id) = fixture(db.clone()).await;
        let worker = NotifyWorker::new(db, Arc::new(FailingNotifier), chrono_tz::UTC);

        let (tx, rx) = mpsc::channel(4);
        let event = WorkflowEvent::new(
            customer_id.clone(),
            WorkflowEventKind::ReservationRequested {
                reservation_id: "reservation:r1".into(),
                restaurant_id,
                customer_id,
                slot_start: 1_717_264_800_000,
                party_size: 2,
            },
        );
        tx.send(Arc::new(event)).await.unwrap();
        drop(tx);

        // Must terminate normally despite the failing notifier
        worker.run(rx).await;
    }
}
