//! Event Router - workflow event fan-out
//!
//! Decouples the workflow engines from their consumers:
//!
//! ```text
//! ReservationEngine / OrderService (broadcast)
//!        │
//!        └── EventRouter
//!               ├── mpsc ──► NotifyWorker (reservation events) [critical]
//!               └── mpsc ──► SyncForwarder (all events)        [best-effort]
//! ```
//!
//! Notifications block on a full channel so none are lost; session
//! sync uses `try_send` and drops with a warning when full.

use shared::{WorkflowEvent, WorkflowEventKind};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Receiving ends handed to the workers
pub struct EventChannels {
    /// Notification events (reservation transitions only)
    pub notify_rx: mpsc::Receiver<Arc<WorkflowEvent>>,
    /// Session sync events (all transitions)
    pub sync_rx: mpsc::Receiver<Arc<WorkflowEvent>>,
}

pub struct EventRouter {
    notify_tx: mpsc::Sender<Arc<WorkflowEvent>>,
    sync_tx: mpsc::Sender<Arc<WorkflowEvent>>,
}

impl EventRouter {
    /// `notify_buffer` should be generous, the notify channel blocks
    /// when full.
    pub fn new(notify_buffer: usize, sync_buffer: usize) -> (Self, EventChannels) {
        let (notify_tx, notify_rx) = mpsc::channel(notify_buffer);
        let (sync_tx, sync_rx) = mpsc::channel(sync_buffer);

        (
            Self {
                notify_tx,
                sync_tx,
            },
            EventChannels { notify_rx, sync_rx },
        )
    }

    /// Run until the source broadcast closes.
    pub async fn run(self, mut source: broadcast::Receiver<WorkflowEvent>) {
        tracing::info!("Event router started");

        loop {
            match source.recv().await {
                Ok(event) => {
                    self.dispatch(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::error!(
                        skipped = n,
                        "Event router lagged, notifications may be missing"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Source channel closed, event router stopping");
                    break;
                }
            }
        }
    }

    async fn dispatch(&self, event: WorkflowEvent) {
        let event = Arc::new(event);

        // Reservation transitions carry a notification; blocking send
        // so none are dropped.
        let notifies = !matches!(event.kind, WorkflowEventKind::OrderStatusChanged { .. });
        if notifies && self.notify_tx.send(Arc::clone(&event)).await.is_err() {
            tracing::error!("Notify channel closed, notification lost");
        }

        // Session refresh is best-effort
        match self.sync_tx.try_send(Arc::clone(&event)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    event_id = %event.event_id,
                    kind = ?event.kind,
                    "Sync channel full, event dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Sync channel closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::OrderStatus;

    fn reservation_event() -> WorkflowEvent {
        WorkflowEvent::new(
            "account:c1",
            WorkflowEventKind::ReservationRequested {
                reservation_id: "reservation:r1".to_string(),
                restaurant_id: "restaurant:x".to_string(),
                customer_id: "account:c1".to_string(),
                slot_start: shared::util::now_millis(),
                party_size: 2,
            },
        )
    }

    fn order_event() -> WorkflowEvent {
        WorkflowEvent::new(
            "account:c1",
            WorkflowEventKind::OrderStatusChanged {
                order_id: "food_order:o1".to_string(),
                restaurant_id: "restaurant:x".to_string(),
                customer_id: "account:c1".to_string(),
                from: OrderStatus::Placed,
                to: OrderStatus::Preparing,
            },
        )
    }

    #[tokio::test]
    async fn reservation_events_hit_both_channels() {
        let (router, mut channels) = EventRouter::new(16, 16);
        let (tx, rx) = broadcast::channel(16);
        tokio::spawn(async move {
            router.run(rx).await;
        });

        tx.send(reservation_event()).unwrap();
        assert!(channels.notify_rx.recv().await.is_some());
        assert!(channels.sync_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn order_events_skip_the_notify_channel() {
        let (router, mut channels) = EventRouter::new(16, 16);
        let (tx, rx) = broadcast::channel(16);
        tokio::spawn(async move {
            router.run(rx).await;
        });

        tx.send(order_event()).unwrap();
        tx.send(reservation_event()).unwrap();

        // First notify arrival must be the reservation event
        let notify = channels.notify_rx.recv().await.unwrap();
        assert!(matches!(
            notify.kind,
            WorkflowEventKind::ReservationRequested { .. }
        ));

        // Sync sees both, in order
        let first = channels.sync_rx.recv().await.unwrap();
        assert!(matches!(
            first.kind,
            WorkflowEventKind::OrderStatusChanged { .. }
        ));
    }

    #[tokio::test]
    async fn full_sync_channel_drops_without_blocking() {
        let (router, mut channels) = EventRouter::new(16, 1);
        let (tx, rx) = broadcast::channel(16);
        tokio::spawn(async move {
            router.run(rx).await;
        });

        for _ in 0..5 {
            tx.send(order_event()).unwrap();
        }
        drop(tx);

        // At least the first one got through; the router must have
        // terminated rather than blocked.
        assert!(channels.sync_rx.recv().await.is_some());
    }
}
