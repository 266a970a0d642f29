//! HTTP client for the object store API.

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};
use url::Url;

use vitrine_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use vitrine_core::{Result, StoreUrl};

use crate::endpoints::StoreErrorResponse;

/// Map a reqwest failure onto the transport taxonomy.
///
/// Connection resets and timeouts come out as retryable
/// [`TransportError::Reset`]/[`TransportError::Timeout`]; everything else
/// fails fast.
pub fn classify(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        return TransportError::Timeout {
            message: err.to_string(),
        }
        .into();
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            let kind = io_err.kind();
            let transport = TransportError::from(io::Error::new(kind, err.to_string()));
            if transport.is_reset() || !err.is_connect() {
                return transport.into();
            }
        }
        source = cause.source();
    }

    if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
        .into()
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
        .into()
    }
}

/// HTTP client for object store requests.
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: reqwest::Client,
    store: StoreUrl,
    headers: HeaderMap,
}

impl StoreClient {
    /// Create a client for the given store.
    ///
    /// `timeout` bounds each individual request, including the body read.
    pub fn new(store: StoreUrl, token: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("vitrine/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(classify)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                InvalidInputError::Other {
                    message: "store token contains invalid header characters".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            client,
            store,
            headers,
        })
    }

    /// Returns the store URL this client is configured for.
    pub fn store(&self) -> &StoreUrl {
        &self.store
    }

    /// URL of the object resource for `key`, one path segment per key segment.
    pub fn object_url(&self, key: &str) -> Result<Url> {
        let mut url = self.store.as_url().clone();
        url.path_segments_mut()
            .map_err(|_| InvalidInputError::StoreUrl {
                value: self.store.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .push(crate::endpoints::OBJECTS)
            .extend(key.split('/'));
        Ok(url)
    }

    /// Authenticated GET of a JSON API resource.
    #[instrument(skip(self), fields(store = %self.store))]
    pub async fn get_json<Q, R>(&self, path: &str, params: &Q) -> Result<R>
    where
        Q: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let url = self.store.endpoint(path);
        debug!(path, "store query");
        trace!(?params, "query parameters");

        let response = self
            .client
            .get(&url)
            .query(params)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(classify)?;

        self.handle_response(response).await
    }

    /// Authenticated GET that maps 404 to `Ok(None)`.
    #[instrument(skip(self), fields(store = %self.store))]
    pub async fn get_json_opt<Q, R>(&self, path: &str, params: &Q) -> Result<Option<R>>
    where
        Q: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let url = self.store.endpoint(path);
        debug!(path, "store lookup");

        let response = self
            .client
            .get(&url)
            .query(params)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(classify)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(response).await.map(Some)
    }

    /// Plain GET of an object body. Object URLs are public; no token is sent.
    #[instrument(skip(self))]
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();
        trace!(%status, "body response");

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                key: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Error::Protocol(self.parse_error_response(response).await));
        }

        response.text().await.map_err(classify)
    }

    /// Authenticated PUT of a raw body, returning the parsed JSON response.
    #[instrument(skip(self, body, headers), fields(store = %self.store))]
    pub async fn put<R>(&self, url: Url, body: String, headers: HeaderMap) -> Result<R>
    where
        R: DeserializeOwned,
    {
        debug!(%url, bytes = body.len(), "store put");

        let response = self
            .client
            .put(url)
            .headers(self.headers.clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        self.handle_response(response).await
    }

    /// Authenticated DELETE. A missing object is not an error.
    #[instrument(skip(self), fields(store = %self.store))]
    pub async fn delete(&self, url: Url) -> Result<()> {
        debug!(%url, "store delete");

        let response = self
            .client
            .delete(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(Error::Protocol(self.parse_error_response(response).await))
        }
    }

    /// Handle a JSON API response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(&self, response: Response) -> Result<R> {
        let status = response.status();
        trace!(%status, "store response");

        if status.is_success() {
            response.json::<R>().await.map_err(|e| {
                if e.is_decode() {
                    Error::Protocol(ProtocolError::new(
                        status.as_u16(),
                        Some("InvalidResponse".to_string()),
                        Some(e.to_string()),
                    ))
                } else {
                    classify(e)
                }
            })
        } else {
            Err(Error::Protocol(self.parse_error_response(response).await))
        }
    }

    /// Parse a store error response.
    async fn parse_error_response(&self, response: Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<StoreErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.error, body.message),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}
