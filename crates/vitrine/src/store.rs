//! Store handles.
//!
//! [`Store`] picks a backend from the store URL: `file://` URLs open a
//! [`FileStore`], `http://` and `https://` URLs an [`HttpStore`].

use std::time::Duration;

use async_trait::async_trait;

use vitrine_core::{ObjectEntry, ObjectStore, PutOptions, Result, StoreUrl};
use vitrine_file::FileStore;
use vitrine_http::HttpStore;

/// An object store handle, either file-backed or HTTP-backed.
#[derive(Debug, Clone)]
pub struct Store {
    url: StoreUrl,
    inner: StoreKind,
}

#[derive(Debug, Clone)]
enum StoreKind {
    File(FileStore),
    Http(HttpStore),
}

impl Store {
    /// Open a store from a URL.
    ///
    /// `token` and `timeout` apply to HTTP stores only.
    pub fn open(url: StoreUrl, token: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let inner = if url.is_local() {
            StoreKind::File(FileStore::from_url(&url)?)
        } else {
            StoreKind::Http(HttpStore::new(url.clone(), token, timeout)?)
        };
        Ok(Self { url, inner })
    }

    /// Returns the store URL for this handle.
    pub fn url(&self) -> &StoreUrl {
        &self.url
    }

    pub fn is_local(&self) -> bool {
        matches!(self.inner, StoreKind::File(_))
    }
}

#[async_trait]
impl ObjectStore for Store {
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ObjectEntry>> {
        match &self.inner {
            StoreKind::File(store) => store.list(prefix, limit).await,
            StoreKind::Http(store) => store.list(prefix, limit).await,
        }
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectEntry>> {
        match &self.inner {
            StoreKind::File(store) => store.head(key).await,
            StoreKind::Http(store) => store.head(key).await,
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        match &self.inner {
            StoreKind::File(store) => store.fetch(url).await,
            StoreKind::Http(store) => store.fetch(url).await,
        }
    }

    async fn put(&self, key: &str, body: &str, options: PutOptions) -> Result<ObjectEntry> {
        match &self.inner {
            StoreKind::File(store) => store.put(key, body, options).await,
            StoreKind::Http(store) => store.put(key, body, options).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match &self.inner {
            StoreKind::File(store) => store.delete(key).await,
            StoreKind::Http(store) => store.delete(key).await,
        }
    }
}
