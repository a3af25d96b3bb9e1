// dt#<key> timestamp convention
//
// Publishers store the send time of key K under the companion key "dt#K",
// formatted as local "YYYYMMDD HHMMSS". Consumers read it back to decide
// whether the data under K is recent enough to trust.

use chrono::{Local, NaiveDateTime};

/// Prefix of the companion timestamp key
pub const TIMESTAMP_KEY_PREFIX: &str = "dt#";

/// chrono format string for `YYYYMMDD HHMMSS`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d %H%M%S";

/// Companion key holding the send time of `key`
pub fn timestamp_key(key: &str) -> String {
    format!("{}{}", TIMESTAMP_KEY_PREFIX, key)
}

pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time in the published format
pub fn now_formatted() -> String {
    format_timestamp(&Local::now().naive_local())
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok()
}

/// Whether `stamp` is at most `max_age_secs` whole seconds older than `now`
///
/// The age is truncated to whole seconds and compared with a strict `>`, so
/// an age of exactly `max_age_secs` still counts as fresh. Timestamps from
/// the future are fresh.
pub fn is_fresh(stamp: &NaiveDateTime, now: &NaiveDateTime, max_age_secs: i64) -> bool {
    now.signed_duration_since(*stamp).num_seconds() <= max_age_secs
}
