//! Shared id and timestamp conventions.

use chrono::{DateTime, Utc};

/// Record ids are opaque UUID strings, matching the source system's
/// string-keyed records.
pub type RecordId = String;

/// Raw sensor readings carry unix epoch seconds.
pub type UnixSeconds = i64;

/// All instants are UTC.
pub type Timestamp = DateTime<Utc>;

/// Scale factor between reading timestamps (seconds) and breach
/// durations (milliseconds).
pub const MILLISECONDS_PER_SECOND: i64 = 1000;

/// Generate a fresh record id.
pub fn new_record_id() -> RecordId {
    uuid::Uuid::new_v4().to_string()
}

/// Convert a raw sensor timestamp to a UTC instant.
///
/// Values outside chrono's representable range clamp to the epoch.
pub fn instant_from_unix(secs: UnixSeconds) -> Timestamp {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
