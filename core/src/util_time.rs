use chrono::prelude::*;

/// Milliseconds since the unix epoch. Sub-millisecond precision is truncated.
pub fn unix_millis(timestamp: &DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}
