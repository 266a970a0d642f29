//! HTTP-backed object store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use vitrine_core::error::InvalidInputError;
use vitrine_core::{ObjectEntry, ObjectStore, PutOptions, Result, StoreUrl};

use crate::client::StoreClient;
use crate::endpoints::*;

/// An object store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: StoreClient,
}

impl HttpStore {
    /// Create a store client with an optional bearer token and per-request
    /// timeout.
    pub fn new(url: StoreUrl, token: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: StoreClient::new(url, token, timeout)?,
        })
    }

    /// Returns the store URL for this instance.
    pub fn url(&self) -> &StoreUrl {
        self.client.store()
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    #[instrument(skip(self), fields(store = %self.url()))]
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ObjectEntry>> {
        let response: ListResponse = self
            .client
            .get_json(OBJECTS, &ListQuery { prefix, limit })
            .await?;

        let mut objects: Vec<ObjectEntry> =
            response.objects.into_iter().map(ObjectEntry::from).collect();
        objects.truncate(limit);

        debug!(count = objects.len(), "listed objects");
        Ok(objects)
    }

    #[instrument(skip(self), fields(store = %self.url()))]
    async fn head(&self, key: &str) -> Result<Option<ObjectEntry>> {
        let entry: Option<ObjectEntryWire> =
            self.client.get_json_opt(OBJECT_META, &MetaQuery { key }).await?;
        Ok(entry.map(ObjectEntry::from))
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        self.client.get_text(url).await
    }

    #[instrument(skip(self, body), fields(store = %self.url()))]
    async fn put(&self, key: &str, body: &str, options: PutOptions) -> Result<ObjectEntry> {
        let url = self.client.object_url(key)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&options.content_type).map_err(|_| {
                InvalidInputError::Other {
                    message: format!("invalid content type '{}'", options.content_type),
                }
            })?,
        );
        headers.insert(
            ALLOW_OVERWRITE,
            HeaderValue::from_static(if options.allow_overwrite {
                "true"
            } else {
                "false"
            }),
        );

        let entry: ObjectEntryWire = self.client.put(url, body.to_string(), headers).await?;
        Ok(entry.into())
    }

    #[instrument(skip(self), fields(store = %self.url()))]
    async fn delete(&self, key: &str) -> Result<()> {
        let url = self.client.object_url(key)?;
        self.client.delete(url).await
    }
}
