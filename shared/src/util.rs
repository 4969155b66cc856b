//! Utility functions

use crate::types::Timestamp;

/// Current time as Unix milliseconds
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a new event/request ID
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
