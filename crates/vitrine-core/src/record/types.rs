//! Record, counter, and page types.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::{RecordKey, SearchScope};

/// A content item: a notice, a gallery entry.
///
/// Only the fields the directory needs are lifted out of the stored JSON;
/// every other field travels through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Store key; the record's only external identifier.
    pub key: RecordKey,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Body text (`content` for notices, `description` for gallery entries).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,

    /// View count embedded in the record body. No longer the source of
    /// truth once a counter object exists for the record.
    #[serde(skip)]
    pub legacy_view_count: u64,

    /// Domain-specific payload fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Case-insensitive substring match against title and/or body.
    ///
    /// An empty or whitespace-only query matches everything.
    pub fn matches(&self, query: &str, scope: SearchScope) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let in_title = || self.title.to_lowercase().contains(&needle);
        let in_body = || {
            self.body
                .as_deref()
                .is_some_and(|b| b.to_lowercase().contains(&needle))
        };

        match scope {
            SearchScope::Title => in_title(),
            SearchScope::Body => in_body(),
            SearchScope::Both => in_title() || in_body(),
        }
    }

    /// Case-insensitive category equality.
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.trim().eq_ignore_ascii_case(category.trim()))
    }
}

/// The body stored at a counter key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterRecord {
    pub view_count: u64,

    /// RFC 3339 time of the last write.
    pub updated_at: String,

    /// Backreference to the owning record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl CounterRecord {
    /// A counter stamped with the current time.
    pub fn now(view_count: u64, key: &RecordKey) -> Self {
        Self {
            view_count,
            updated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            key: Some(key.to_string()),
        }
    }
}

/// A record on a returned page, with its resolved view count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRow {
    #[serde(flatten)]
    pub record: Record,
    pub view_count: u64,
}

/// One page of a sorted listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub page: u32,
    pub page_size: u32,

    /// Number of records that parsed and passed the filters.
    pub total: usize,

    pub rows: Vec<PageRow>,

    /// Set when at least one listed object could not be fetched or parsed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}
