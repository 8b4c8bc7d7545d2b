//! ISO-8601 date handling for the persisted snapshot.
//!
//! Dates are written the way browsers print them (`2024-03-01T08:30:00.000Z`)
//! and read back leniently: a value that is not a parseable date string
//! becomes `None` instead of failing the whole snapshot.
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

pub type Timestamp = DateTime<Utc>;

/// Current time at millisecond precision, so in-memory values survive a
/// save/load cycle unchanged.
pub fn now() -> Timestamp {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Format a timestamp as ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_iso(date: &Timestamp) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 string. Accepts RFC 3339, naive date-times (read as UTC)
/// and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_iso(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter for optional timestamps.
pub mod lenient {
    use super::{format_iso, parse_iso, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Timestamp>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&format_iso(date)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Timestamp>, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(d)?;
        Ok(match raw {
            Some(serde_json::Value::String(s)) => parse_iso(&s),
            _ => None,
        })
    }
}
