//! Object store endpoint paths and request/response types.

use serde::Deserialize;

use vitrine_core::ObjectEntry;

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Listing and per-object writes live under this path.
pub const OBJECTS: &str = "objects";

/// Single-object metadata lookup.
pub const OBJECT_META: &str = "objects/meta";

/// Header carrying the overwrite permission on `PUT`.
pub const ALLOW_OVERWRITE: &str = "x-allow-overwrite";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for a listing.
#[derive(Debug, serde::Serialize)]
pub struct ListQuery<'a> {
    pub prefix: &'a str,
    pub limit: usize,
}

/// Query parameters for a metadata lookup.
#[derive(Debug, serde::Serialize)]
pub struct MetaQuery<'a> {
    pub key: &'a str,
}

/// Response from a listing.
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub objects: Vec<ObjectEntryWire>,
}

/// One object as the store describes it.
#[derive(Debug, Deserialize)]
pub struct ObjectEntryWire {
    #[serde(alias = "pathname")]
    pub key: String,
    pub url: String,
}

impl From<ObjectEntryWire> for ObjectEntry {
    fn from(wire: ObjectEntryWire) -> Self {
        ObjectEntry {
            key: wire.key,
            url: wire.url,
        }
    }
}

/// Store error response format.
#[derive(Debug, Deserialize)]
pub struct StoreErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}
