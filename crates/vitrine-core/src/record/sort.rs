//! Sort key resolution.
//!
//! Records are ordered newest first by a numeric timestamp taken from, in
//! order: `updatedAt`, `createdAt`, a date embedded in the key, or zero. The
//! key string breaks ties, so the order is total and pages stay stable
//! across repeated requests.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::Record;

/// `(numeric order, tie-breaker)` for one record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    /// Milliseconds since the Unix epoch, or `0` when no date is known.
    pub order: i64,
    /// The raw record key.
    pub tie_breaker: String,
}

impl SortKey {
    /// Resolve the sort key of a record.
    pub fn resolve(record: &Record) -> Self {
        let order = record
            .updated_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| record.created_at.as_deref().and_then(parse_timestamp))
            .or_else(|| timestamp_in_key(record.key.as_str()))
            .unwrap_or(0);

        Self {
            order,
            tie_breaker: record.key.to_string(),
        }
    }

    /// Newest first; ties broken by descending key.
    pub fn newest_first(a: &SortKey, b: &SortKey) -> Ordering {
        b.cmp(a)
    }
}

/// Parse a stored timestamp into epoch milliseconds.
///
/// Accepts RFC 3339, naive `YYYY-MM-DD[ T]HH:MM:SS[.fff]` (read as UTC),
/// bare dates, and all-digit epoch seconds (10 digits) or milliseconds
/// (13 digits).
pub fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        return epoch_digits(s);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Extract a timestamp embedded in a key's file name.
///
/// Recognises a leading epoch (`1715000000000-ab12.json`) and a date or
/// date-time anywhere in the name (`2024-05-01T12-30-00-000Z-ab12.json`,
/// `notice-2024-05-01.json`).
pub fn timestamp_in_key(key: &str) -> Option<i64> {
    let name = key.rsplit('/').next().unwrap_or(key);

    let leading: &str = &name[..name.bytes().take_while(u8::is_ascii_digit).count()];
    if let Some(ms) = epoch_digits(leading) {
        return Some(ms);
    }

    let bytes = name.as_bytes();
    for i in 0..bytes.len() {
        if !starts_date(bytes, i) {
            continue;
        }
        if let Some(ms) = date_at(&name[i..]) {
            return Some(ms);
        }
    }

    None
}

fn epoch_digits(digits: &str) -> Option<i64> {
    let n: i64 = digits.parse().ok()?;
    match digits.len() {
        13 => DateTime::from_timestamp_millis(n).map(|dt| dt.timestamp_millis()),
        10 => DateTime::from_timestamp(n, 0).map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}

/// `YYYY-` at `i`, not preceded by another digit.
fn starts_date(bytes: &[u8], i: usize) -> bool {
    bytes.len() >= i + 10
        && bytes[i..i + 4].iter().all(u8::is_ascii_digit)
        && bytes[i + 4] == b'-'
        && (i == 0 || !bytes[i - 1].is_ascii_digit())
}

fn date_at(s: &str) -> Option<i64> {
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H-%M-%S"] {
        if let Ok((dt, _)) = NaiveDateTime::parse_and_remainder(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_and_remainder(s, "%Y-%m-%d")
        .ok()
        .and_then(|(d, _)| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
