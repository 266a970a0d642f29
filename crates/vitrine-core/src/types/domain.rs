//! Content domain type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Namespace, RecordKey};
use crate::error::{Error, InvalidInputError};

/// Suffix shared by every built-in domain.
pub const JSON_SUFFIX: &str = ".json";

/// A content domain: a record namespace plus its sibling counter namespace.
///
/// # Example
///
/// ```
/// use vitrine_core::Domain;
///
/// let notices = Domain::notices();
/// let key = notices.validate_key("notices/1715000000000-ab12.json").unwrap();
/// let counter = notices.counter_key(&key).unwrap();
/// assert_eq!(counter.as_str(), "notices-views/1715000000000-ab12.json");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Domain {
    name: String,
    records: Namespace,
    counters: Namespace,
}

impl Domain {
    /// Create a domain from its name and prefixes.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a lowercase slug, either prefix
    /// is invalid, or the two prefixes overlap.
    pub fn new(
        name: impl Into<String>,
        prefix: &str,
        counter_prefix: &str,
        suffix: &str,
    ) -> Result<Self, Error> {
        let name = name.into();
        Self::validate_name(&name)?;

        let records = Namespace::new(prefix, suffix)?;
        let counters = Namespace::new(counter_prefix, suffix)?;

        if counter_prefix.starts_with(prefix) || prefix.starts_with(counter_prefix) {
            return Err(InvalidInputError::Domain {
                value: name,
                reason: "record and counter prefixes must not nest".to_string(),
            }
            .into());
        }

        Ok(Self {
            name,
            records,
            counters,
        })
    }

    /// The notice board domain.
    pub fn notices() -> Self {
        Self::builtin("notices")
    }

    /// The gallery domain.
    pub fn gallery() -> Self {
        Self::builtin("gallery")
    }

    fn builtin(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: Namespace::trusted(format!("{}/", name), JSON_SUFFIX),
            counters: Namespace::trusted(format!("{}-views/", name), JSON_SUFFIX),
        }
    }

    /// Returns the domain name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the record namespace.
    pub fn records(&self) -> &Namespace {
        &self.records
    }

    /// Returns the counter namespace.
    pub fn counters(&self) -> &Namespace {
        &self.counters
    }

    /// Validate a client-supplied record key for this domain.
    pub fn validate_key(&self, raw: &str) -> Result<RecordKey, Error> {
        self.records.validate(raw)
    }

    /// Derive the counter key that belongs to a record key.
    pub fn counter_key(&self, key: &RecordKey) -> Result<RecordKey, Error> {
        self.records.rebase(key, &self.counters)
    }

    fn validate_name(name: &str) -> Result<(), Error> {
        let ok = !name.is_empty()
            && name.len() <= 64
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !name.starts_with('-');

        if ok {
            Ok(())
        } else {
            Err(InvalidInputError::Domain {
                value: name.to_string(),
                reason: "must be a lowercase slug".to_string(),
            }
            .into())
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Which record fields a text search inspects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    Title,
    Body,
    #[default]
    Both,
}

impl SearchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchScope::Title => "title",
            SearchScope::Body => "body",
            SearchScope::Both => "both",
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(SearchScope::Title),
            "body" | "content" => Ok(SearchScope::Body),
            "both" | "all" | "" => Ok(SearchScope::Both),
            other => Err(InvalidInputError::Other {
                message: format!("unknown search scope '{}'", other),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_domains() {
        let gallery = Domain::gallery();
        assert_eq!(gallery.records().prefix(), "gallery/");
        assert_eq!(gallery.counters().prefix(), "gallery-views/");
        assert_eq!(gallery.records().suffix(), ".json");
    }

    #[test]
    fn counter_key_mirrors_record_path() {
        let notices = Domain::notices();
        let key = notices.validate_key("notices/2024/a.json").unwrap();
        assert_eq!(
            notices.counter_key(&key).unwrap().as_str(),
            "notices-views/2024/a.json"
        );
    }

    #[test]
    fn custom_domain() {
        let domain = Domain::new("records", "records/", "records-views/", ".json").unwrap();
        assert!(domain.validate_key("records/x.json").is_ok());
        assert!(domain.validate_key("records-views/x.json").is_err());
    }

    #[test]
    fn nested_prefixes_rejected() {
        assert!(Domain::new("records", "records/", "records/views/", ".json").is_err());
    }

    #[test]
    fn invalid_names_rejected() {
        assert!(Domain::new("Records", "records/", "records-views/", ".json").is_err());
        assert!(Domain::new("", "records/", "records-views/", ".json").is_err());
        assert!(Domain::new("a/b", "records/", "records-views/", ".json").is_err());
    }

    #[test]
    fn scope_parsing() {
        assert_eq!("title".parse::<SearchScope>().unwrap(), SearchScope::Title);
        assert_eq!("CONTENT".parse::<SearchScope>().unwrap(), SearchScope::Body);
        assert_eq!("".parse::<SearchScope>().unwrap(), SearchScope::Both);
        assert!("everything".parse::<SearchScope>().is_err());
    }
}
