use chrono::{DateTime, TimeZone, Utc};

/// Timestamp type (an exact UTC instant). Two timestamps are the same row key
/// only if they denote the same instant.
pub type Timestamp = DateTime<Utc>;

/// Value type.
pub type Value = f64;

/// Returns the Unix epoch in milliseconds for a timestamp, as used on the wire by
/// time-series responses.
#[inline]
pub fn to_unix_millis(ts: &Timestamp) -> i64 {
    ts.timestamp_millis()
}

/// Converts Unix milliseconds back into a timestamp, or `None` if chrono cannot represent it.
pub fn from_unix_millis(millis: i64) -> Option<Timestamp> {
    Utc.timestamp_millis_opt(millis).single()
}
