//! Workflow events - immutable facts emitted after a state transition
//!
//! Every reservation or order transition that commits produces exactly one
//! [`WorkflowEvent`]. The server broadcasts them; the event router fans them
//! out to the notification worker and to connected presentation sessions.

use serde::{Deserialize, Serialize};

use crate::models::{OrderStatus, ReservationStatus};
use crate::types::Timestamp;
use crate::util;

/// Which side of the table initiated an action (used to pick the
/// notification recipient: the *other* party gets notified).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorSide {
    Customer,
    Staff,
}

/// Workflow event - immutable record of a committed transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Event unique ID
    pub event_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: Timestamp,
    /// Account that triggered the transition
    pub actor_id: String,
    /// What happened
    pub kind: WorkflowEventKind,
}

impl WorkflowEvent {
    pub fn new(actor_id: impl Into<String>, kind: WorkflowEventKind) -> Self {
        Self {
            event_id: util::new_id(),
            timestamp: util::now_millis(),
            actor_id: actor_id.into(),
            kind,
        }
    }

    /// Resource name used for session sync payloads.
    pub fn resource(&self) -> &'static str {
        match self.kind {
            WorkflowEventKind::ReservationRequested { .. }
            | WorkflowEventKind::ReservationConfirmed { .. }
            | WorkflowEventKind::ReservationCancelled { .. } => "reservation",
            WorkflowEventKind::OrderStatusChanged { .. } => "order",
        }
    }
}

/// Event payloads, one per transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowEventKind {
    ReservationRequested {
        reservation_id: String,
        restaurant_id: String,
        customer_id: String,
        slot_start: Timestamp,
        party_size: u32,
    },
    ReservationConfirmed {
        reservation_id: String,
        restaurant_id: String,
        customer_id: String,
        table_id: String,
        table_name: String,
        slot_start: Timestamp,
    },
    ReservationCancelled {
        reservation_id: String,
        restaurant_id: String,
        customer_id: String,
        /// Side that cancelled; the other side gets notified
        cancelled_by: ActorSide,
        /// Table that was released, if the reservation was Confirmed
        released_table_id: Option<String>,
        previous_status: ReservationStatus,
    },
    OrderStatusChanged {
        order_id: String,
        restaurant_id: String,
        customer_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Session sync payload pushed to connected presentation sessions.
///
/// `version` increments per resource so a session can discard stale
/// refreshes that arrive out of order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Resource type ("reservation", "order")
    pub resource: String,
    /// Monotonic version per resource type
    pub version: u64,
    /// Record ID the refresh concerns
    pub id: String,
    /// Event data for the partial refresh
    pub data: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_serializes_with_screaming_tag() {
        let event = WorkflowEvent::new(
            "account:a1",
            WorkflowEventKind::ReservationRequested {
                reservation_id: "reservation:r1".into(),
                restaurant_id: "restaurant:x".into(),
                customer_id: "account:a1".into(),
                slot_start: 1_700_000_000_000,
                party_size: 4,
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["type"], "RESERVATION_REQUESTED");
    }

    #[test]
    fn resource_maps_by_kind() {
        let event = WorkflowEvent::new(
            "account:a1",
            WorkflowEventKind::OrderStatusChanged {
                order_id: "order:o1".into(),
                restaurant_id: "restaurant:x".into(),
                customer_id: "account:a1".into(),
                from: OrderStatus::Placed,
                to: OrderStatus::Preparing,
            },
        );
        assert_eq!(event.resource(), "order");
    }
}
