//! Defensive decoding of raw object bodies.
//!
//! The store sometimes answers a body read with something that is not the
//! object at all: an HTML error page, a plain-text rate-limit notice. Those
//! are detected by sniffing the start of the payload and, like malformed
//! JSON, reported as [`Error::Corrupted`]. The `Option` wrappers collapse
//! every failure to "absent" for listing paths.

use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Number, Value};

use super::sort::parse_timestamp;
use super::{CounterRecord, Record};
use crate::error::Error;
use crate::types::RecordKey;

/// How many leading characters are inspected when sniffing.
const SNIFF_LEN: usize = 64;

const TITLE_FIELDS: &[&str] = &["title", "name", "subject"];
const CATEGORY_FIELDS: &[&str] = &["category", "tag"];
const CREATED_FIELDS: &[&str] = &["createdAt", "created_at", "date"];
const UPDATED_FIELDS: &[&str] = &["updatedAt", "updated_at"];
const BODY_FIELDS: &[&str] = &["content", "body", "description"];
const IMAGE_FIELDS: &[&str] = &["images", "imageUrls", "image"];
const VIEW_FIELDS: &[&str] = &["viewCount", "views", "view_count"];
const DROPPED_FIELDS: &[&str] = &["key", "pathname"];

/// What a raw payload looks like before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Nothing but whitespace.
    Empty,
    /// An HTML (or XML) document, typically an error page.
    Html,
    /// A plain-text "too many requests" style notice.
    RateLimitNotice,
    /// Anything else; worth handing to the JSON decoder.
    Data,
}

impl Payload {
    pub fn describe(&self) -> &'static str {
        match self {
            Payload::Empty => "empty body",
            Payload::Html => "HTML document instead of JSON",
            Payload::RateLimitNotice => "rate-limit notice instead of JSON",
            Payload::Data => "data",
        }
    }
}

/// Classify a payload by its first bytes.
pub fn sniff(raw: &str) -> Payload {
    let head: String = raw
        .trim_start_matches('\u{feff}')
        .trim_start()
        .chars()
        .take(SNIFF_LEN)
        .collect::<String>()
        .to_ascii_lowercase();

    if head.is_empty() {
        Payload::Empty
    } else if head.starts_with('<') {
        Payload::Html
    } else if head.starts_with("too many requests")
        || head.starts_with("rate limit")
        || head.starts_with("rate exceeded")
        || head.starts_with("error code: 429")
        || head.starts_with("429")
    {
        Payload::RateLimitNotice
    } else {
        Payload::Data
    }
}

/// Decode a record body.
///
/// # Errors
///
/// Returns [`Error::Corrupted`] when the payload is a disguised error page,
/// is not JSON, or is not a JSON object.
pub fn decode_record(key: &RecordKey, raw: &str) -> Result<Record, Error> {
    let mut obj = decode_object(key.as_str(), raw)?;

    let title = take_string(&mut obj, TITLE_FIELDS).unwrap_or_default();
    let category = take_string(&mut obj, CATEGORY_FIELDS);
    let created_at = take_timestamp(&mut obj, CREATED_FIELDS);
    let updated_at = take_timestamp(&mut obj, UPDATED_FIELDS);
    let body = take_string(&mut obj, BODY_FIELDS);
    let images = take_images(&mut obj);
    let legacy_view_count = take_count(&mut obj, VIEW_FIELDS);

    for field in DROPPED_FIELDS {
        obj.remove(*field);
    }

    Ok(Record {
        key: key.clone(),
        title,
        category,
        created_at,
        updated_at,
        body,
        images,
        legacy_view_count,
        extra: obj,
    })
}

/// Decode a record body, treating every failure as absence.
pub fn parse_record(key: &RecordKey, raw: &str) -> Option<Record> {
    decode_record(key, raw).ok()
}

/// Decode a counter body.
///
/// # Errors
///
/// Returns [`Error::Corrupted`] for the same payloads [`decode_record`]
/// rejects.
pub fn decode_counter(key: &RecordKey, raw: &str) -> Result<CounterRecord, Error> {
    let mut obj = decode_object(key.as_str(), raw)?;

    let view_count = take_count(&mut obj, &["viewCount", "views", "count"]);
    let updated_at = take_timestamp(&mut obj, UPDATED_FIELDS).unwrap_or_default();
    let owner = take_string(&mut obj, &["key"]);

    Ok(CounterRecord {
        view_count,
        updated_at,
        key: owner,
    })
}

/// Decode a counter body, treating every failure as absence.
pub fn parse_counter(key: &RecordKey, raw: &str) -> Option<CounterRecord> {
    decode_counter(key, raw).ok()
}

fn decode_object(key: &str, raw: &str) -> Result<Map<String, Value>, Error> {
    let corrupted = |reason: String| Error::Corrupted {
        key: key.to_string(),
        reason,
    };

    let kind = sniff(raw);
    if kind != Payload::Data {
        return Err(corrupted(kind.describe().to_string()));
    }

    let value: Value = serde_json::from_str(raw.trim_start_matches('\u{feff}'))
        .map_err(|e| corrupted(format!("malformed JSON: {}", e)))?;

    match value {
        Value::Object(obj) => Ok(obj),
        other => Err(corrupted(format!(
            "expected a JSON object, found {}",
            json_type(&other)
        ))),
    }
}

/// Remove every alias and return the first usable non-empty string.
fn take_string(obj: &mut Map<String, Value>, names: &[&str]) -> Option<String> {
    let mut found = None;
    for name in names {
        if let Some(Value::String(s)) = obj.remove(*name)
            && found.is_none()
            && !s.trim().is_empty()
        {
            found = Some(s);
        }
    }
    found
}

/// Like [`take_string`], but numbers are read as epoch milliseconds.
fn take_timestamp(obj: &mut Map<String, Value>, names: &[&str]) -> Option<String> {
    let mut found = None;
    for name in names {
        let Some(value) = obj.remove(*name) else {
            continue;
        };
        if found.is_some() {
            continue;
        }
        found = match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => epoch_number(&n)
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            _ => None,
        };
    }
    found
}

/// Epoch milliseconds of a numeric timestamp, read with the same
/// seconds-or-milliseconds digit rule as string timestamps.
fn epoch_number(n: &Number) -> Option<i64> {
    let whole = match n.as_u64() {
        Some(u) => u,
        None => n
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < 1e15)
            .map(|f| f as u64)?,
    };
    parse_timestamp(&whole.to_string())
}

/// Remove every alias and return the first count, clamped to a finite,
/// non-negative integer. Anything unusable reads as `0`.
fn take_count(obj: &mut Map<String, Value>, names: &[&str]) -> u64 {
    let mut found = None;
    for name in names {
        if let Some(value) = obj.remove(*name)
            && found.is_none()
        {
            found = Some(non_negative(&value));
        }
    }
    found.unwrap_or(0)
}

fn non_negative(value: &Value) -> u64 {
    let n = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u;
            }
            n.as_f64()
        }
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match n {
        Some(f) if f.is_finite() && f > 0.0 => f.floor() as u64,
        _ => 0,
    }
}

fn take_images(obj: &mut Map<String, Value>) -> Vec<String> {
    let mut found: Option<Vec<String>> = None;
    for name in IMAGE_FIELDS {
        let Some(value) = obj.remove(*name) else {
            continue;
        };
        if found.is_some() {
            continue;
        }
        let images = match value {
            Value::String(s) if !s.is_empty() => vec![s],
            Value::Array(items) => items.into_iter().filter_map(image_url).collect(),
            _ => Vec::new(),
        };
        if !images.is_empty() {
            found = Some(images);
        }
    }
    found.unwrap_or_default()
}

fn image_url(item: Value) -> Option<String> {
    match item {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Object(mut obj) => match obj.remove("url") {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
