//! Object store trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One object as reported by the store's listing or metadata calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// The object key.
    pub key: String,
    /// Where the body can be fetched.
    pub url: String,
}

/// Options for [`ObjectStore::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    /// MIME type stored with the object.
    pub content_type: String,
    /// Whether an existing object at the key may be replaced.
    pub allow_overwrite: bool,
}

impl PutOptions {
    /// JSON body that replaces whatever is at the key.
    pub fn json_overwrite() -> Self {
        Self {
            content_type: "application/json".to_string(),
            allow_overwrite: true,
        }
    }

    /// JSON body that must not replace an existing object.
    pub fn json_create() -> Self {
        Self {
            content_type: "application/json".to_string(),
            allow_overwrite: false,
        }
    }
}

/// A list/get/put/delete blob store.
///
/// There is no query, index, transaction, or atomic counter. Bodies are read
/// in two steps: the listing or [`head`](ObjectStore::head) call yields a URL,
/// and [`fetch`](ObjectStore::fetch) reads it. Fetches are the calls the store
/// rate-limits.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List up to `limit` objects whose key starts with `prefix`.
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ObjectEntry>>;

    /// Look up a single object. `Ok(None)` when nothing is stored at `key`.
    async fn head(&self, key: &str) -> Result<Option<ObjectEntry>>;

    /// Read the raw body at a URL returned by `list` or `head`.
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Store `body` at `key`.
    async fn put(&self, key: &str, body: &str, options: PutOptions) -> Result<ObjectEntry>;

    /// Delete the object at `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ObjectEntry>> {
        (**self).list(prefix, limit).await
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectEntry>> {
        (**self).head(key).await
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url).await
    }

    async fn put(&self, key: &str, body: &str, options: PutOptions) -> Result<ObjectEntry> {
        (**self).put(key, body, options).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }
}
