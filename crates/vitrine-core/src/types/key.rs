//! Record key and namespace types.

use serde::Serialize;
use std::fmt;

use crate::error::{Error, InvalidInputError};

/// Maximum accepted key length in bytes.
const MAX_KEY_LEN: usize = 1024;

/// A validated object key.
///
/// A `RecordKey` has passed the rules of the [`Namespace`] that produced it:
/// it starts with the namespace prefix, ends with its suffix, and contains
/// no traversal or empty path segments. It is the sole external identifier
/// of a record and never changes once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct RecordKey(String);

impl RecordKey {
    /// Returns the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RecordKey> for String {
    fn from(key: RecordKey) -> Self {
        key.0
    }
}

impl AsRef<str> for RecordKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A key namespace: a prefix such as `notices/` plus a suffix such as `.json`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Namespace {
    prefix: String,
    suffix: String,
}

impl Namespace {
    /// Create a namespace. The prefix must end with `/` and contain no
    /// traversal segments.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix or suffix is unusable.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Result<Self, Error> {
        let prefix = prefix.into();
        let suffix = suffix.into();

        let invalid = |reason: &str| -> Error {
            InvalidInputError::Key {
                value: format!("{}*{}", prefix, suffix),
                reason: reason.to_string(),
            }
            .into()
        };

        if prefix.len() < 2 || !prefix.ends_with('/') {
            return Err(invalid("namespace prefix must be non-empty and end with '/'"));
        }
        if prefix.starts_with('/') || prefix.contains("//") || has_traversal(&prefix) {
            return Err(invalid("namespace prefix must be a relative, normalized path"));
        }
        if suffix.contains('/') {
            return Err(invalid("namespace suffix cannot contain '/'"));
        }

        Ok(Self { prefix, suffix })
    }

    /// Build a namespace from literals already known to be valid.
    pub(crate) fn trusted(prefix: String, suffix: &str) -> Self {
        Self {
            prefix,
            suffix: suffix.to_string(),
        }
    }

    /// Returns the prefix, including its trailing `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the suffix.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Validate a raw, possibly client-supplied key against this namespace.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Key`] when the key is outside the
    /// namespace, has the wrong suffix, or contains `..` or `//`.
    pub fn validate(&self, raw: &str) -> Result<RecordKey, Error> {
        let reject = |reason: String| -> Error {
            InvalidInputError::Key {
                value: raw.to_string(),
                reason,
            }
            .into()
        };

        if raw.len() > MAX_KEY_LEN {
            return Err(reject(format!("exceeds {} bytes", MAX_KEY_LEN)));
        }
        if !raw.starts_with(&self.prefix) {
            return Err(reject(format!("must start with '{}'", self.prefix)));
        }
        if !raw.ends_with(&self.suffix) {
            return Err(reject(format!("must end with '{}'", self.suffix)));
        }
        if raw.contains("//") {
            return Err(reject("contains an empty path segment".to_string()));
        }
        if has_traversal(raw) {
            return Err(reject("contains a parent-directory segment".to_string()));
        }
        if raw.contains('\\') || raw.chars().any(char::is_control) {
            return Err(reject("contains a forbidden character".to_string()));
        }

        let name = &raw[self.prefix.len()..raw.len() - self.suffix.len()];
        if name.is_empty() || name.ends_with('/') {
            return Err(reject("has no name between prefix and suffix".to_string()));
        }

        Ok(RecordKey(raw.to_string()))
    }

    /// Returns true if `raw` would pass [`validate`](Self::validate).
    pub fn accepts(&self, raw: &str) -> bool {
        self.validate(raw).is_ok()
    }

    /// Map a key from this namespace into `target`, keeping the remainder
    /// of the path identical.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not belong to this namespace or the
    /// derived key is rejected by `target`.
    pub fn rebase(&self, key: &RecordKey, target: &Namespace) -> Result<RecordKey, Error> {
        let rest = key.as_str().strip_prefix(&self.prefix).ok_or_else(|| {
            Error::from(InvalidInputError::Key {
                value: key.to_string(),
                reason: format!("not under '{}'", self.prefix),
            })
        })?;
        let stem = rest.strip_suffix(&self.suffix).unwrap_or(rest);
        target.validate(&format!("{}{}{}", target.prefix, stem, target.suffix))
    }
}

fn has_traversal(path: &str) -> bool {
    path.split('/').any(|segment| segment == ".." || segment == ".")
}
