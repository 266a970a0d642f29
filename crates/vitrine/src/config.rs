//! Directory configuration.
//!
//! Loaded from JSON. Every field has a default, so `{}` is a complete
//! configuration serving the built-in `notices` and `gallery` domains.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use vitrine_core::error::InvalidInputError;
use vitrine_core::types::JSON_SUFFIX;
use vitrine_core::{Domain, Error, Result};

use crate::retry::RetryPolicy;

const MIN_MULTIPLIER: f64 = 1.0;
const MAX_MULTIPLIER: f64 = 10.0;

/// Tunables for listing, batching, retrying, and the served domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectoryConfig {
    /// Hard cap on keys returned by one listing call.
    pub list_limit: usize,

    /// Concurrent record fetches per batch.
    pub batch_size: usize,

    /// Concurrent counter reads per batch.
    pub counter_batch_size: usize,

    pub retry: RetryPolicy,

    /// Per-request timeout against the store; `0` disables it.
    pub request_timeout_ms: u64,

    pub domains: Vec<DomainConfig>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            list_limit: 1000,
            batch_size: 8,
            counter_batch_size: 8,
            retry: RetryPolicy::default(),
            request_timeout_ms: 10_000,
            domains: vec![DomainConfig::builtin("notices"), DomainConfig::builtin("gallery")],
        }
    }
}

/// One content domain as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConfig {
    pub name: String,
    pub prefix: String,
    pub counter_prefix: String,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

fn default_suffix() -> String {
    JSON_SUFFIX.to_string()
}

impl DomainConfig {
    fn builtin(name: &str) -> Self {
        Self {
            name: name.to_string(),
            prefix: format!("{}/", name),
            counter_prefix: format!("{}-views/", name),
            suffix: default_suffix(),
        }
    }
}

impl DirectoryConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| InvalidInputError::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file, falling back to defaults when it does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(InvalidInputError::Config {
                reason: format!("cannot read {}: {}", path.display(), e),
            }
            .into()),
        }
    }

    /// Check the values serde cannot.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| -> Error { InvalidInputError::Config { reason }.into() };

        if self.list_limit == 0 {
            return Err(invalid("listLimit must be at least 1".into()));
        }
        if self.batch_size == 0 || self.counter_batch_size == 0 {
            return Err(invalid("batch sizes must be at least 1".into()));
        }
        let multiplier = self.retry.backoff_multiplier;
        if !(MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&multiplier) {
            return Err(invalid(format!(
                "retry.backoffMultiplier must be between {} and {}",
                MIN_MULTIPLIER, MAX_MULTIPLIER
            )));
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(invalid(
                "retry.initialDelayMs must not exceed retry.maxDelayMs".into(),
            ));
        }

        let mut seen = HashSet::new();
        for domain in &self.domains {
            if !seen.insert(domain.name.as_str()) {
                return Err(invalid(format!("duplicate domain '{}'", domain.name)));
            }
        }

        self.domains()?;
        Ok(())
    }

    /// Build the configured domains.
    pub fn domains(&self) -> Result<Vec<Domain>> {
        self.domains
            .iter()
            .map(|d| Domain::new(&d.name, &d.prefix, &d.counter_prefix, &d.suffix))
            .collect()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}
