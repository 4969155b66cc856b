//! Reservation Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::{ReservationStatus, Timestamp};
use surrealdb::RecordId;

/// Reservation ID type
pub type ReservationId = RecordId;

/// Reservation entity
///
/// `table` is set exactly while status is Confirmed; a cancellation
/// clears it again. Reservations are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ReservationId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub customer: RecordId,
    /// Requested slot start, Unix milliseconds (UTC)
    pub slot_start: Timestamp,
    pub party_size: u32,
    pub status: ReservationStatus,
    /// Assigned table, only while Confirmed. Stored as `dining_table`
    /// because `table` collides with a SurrealQL keyword.
    #[serde(
        rename = "dining_table",
        default,
        with = "serde_helpers::option_record_id"
    )]
    pub table: Option<RecordId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request reservation payload (customer-facing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    /// Restaurant record ID ("restaurant:abc")
    pub restaurant: String,
    /// Slot start, Unix milliseconds (UTC)
    pub slot_start: Timestamp,
    pub party_size: u32,
}
