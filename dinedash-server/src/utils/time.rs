//! Time helpers
//!
//! Timestamps are stored as Unix milliseconds throughout. Restaurant hours
//! are wall-clock times interpreted in the configured business timezone.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use shared::Timestamp;

/// Current time as Unix milliseconds
pub fn now_millis() -> Timestamp {
    shared::util::now_millis()
}

/// Convert a Unix-millisecond timestamp into the business timezone.
///
/// Returns `None` for timestamps outside chrono's representable range.
pub fn millis_to_local(ts: Timestamp, tz: Tz) -> Option<DateTime<Tz>> {
    Utc.timestamp_millis_opt(ts)
        .single()
        .map(|dt| dt.with_timezone(&tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn millis_convert_respects_timezone() {
        // 2024-06-01T19:00:00Z
        let ts = 1_717_268_400_000;
        let utc = millis_to_local(ts, chrono_tz::UTC).unwrap();
        assert_eq!(utc.hour(), 19);
        // Madrid is UTC+2 in June
        let madrid = millis_to_local(ts, chrono_tz::Europe::Madrid).unwrap();
        assert_eq!(madrid.hour(), 21);
    }
}
