//! Object store URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated object store location.
///
/// Network stores must use HTTPS (HTTP is accepted for localhost only).
/// `file://` URLs point at a directory used as a local object store.
///
/// # Example
///
/// ```
/// use vitrine_core::StoreUrl;
///
/// let store = StoreUrl::new("https://blob.example.com/").unwrap();
/// assert_eq!(store.endpoint("objects"), "https://blob.example.com/objects");
///
/// let local = StoreUrl::new("file:///tmp/vitrine").unwrap();
/// assert!(local.is_local());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreUrl(Url);

impl StoreUrl {
    /// Create a new store URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error for unparseable URLs, plain HTTP to a remote host,
    /// and URLs carrying a query or fragment.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::StoreUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the URL of an API path below the store root.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns true if this is a local filesystem store.
    pub fn is_local(&self) -> bool {
        self.0.scheme() == "file"
    }

    /// Returns true if this is a network store.
    pub fn is_network(&self) -> bool {
        let scheme = self.0.scheme();
        scheme == "http" || scheme == "https"
    }

    /// Returns the filesystem path for file:// URLs.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.is_local() {
            self.0.to_file_path().ok()
        } else {
            None
        }
    }

    fn validate(url: &Url, raw: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::StoreUrl {
                value: raw.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        let scheme = url.scheme();

        if scheme == "file" {
            if url.path().is_empty() || url.path() == "/" {
                return Err(invalid("file:// URL must name a directory"));
            }
            return Ok(());
        }

        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(invalid("must use HTTPS (HTTP allowed only for localhost)"));
        }

        if url.host_str().is_none() {
            return Err(invalid("must have a host"));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("cannot carry a query or fragment"));
        }

        Ok(())
    }
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StoreUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for StoreUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for StoreUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        StoreUrl::new(&s).map_err(serde::de::Error::custom)
    }
}
