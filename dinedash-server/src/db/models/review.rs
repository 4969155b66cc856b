//! Restaurant Review Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::Timestamp;
use surrealdb::RecordId;

/// Review entity. One per (customer, restaurant), enforced by a unique
/// index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub customer: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    /// Rating out of 5
    pub rating: u8,
    pub description: String,
    pub created_at: Timestamp,
}

/// Create review payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    pub rating: u8,
    pub description: String,
}
