//! Application state shared across handlers.

use std::collections::HashMap;
use std::sync::Arc;

use vitrine::{ContentDirectory, DirectoryConfig, Domain, ObjectStore, Result};

use crate::error::{ApiError, ApiResult};

/// Store handle type used by the server.
pub type SharedStore = Arc<dyn ObjectStore>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<ContentDirectory<SharedStore>>,
    domains: Arc<HashMap<String, Domain>>,
}

impl AppState {
    /// Build state serving the configured domains from `store`.
    pub fn new(store: SharedStore, config: &DirectoryConfig) -> Result<Self> {
        config.validate()?;
        let domains = config
            .domains()?
            .into_iter()
            .map(|d| (d.name().to_string(), d))
            .collect();

        Ok(Self {
            directory: Arc::new(ContentDirectory::new(store, config)),
            domains: Arc::new(domains),
        })
    }

    /// Look up a served domain by name.
    pub fn domain(&self, name: &str) -> ApiResult<&Domain> {
        self.domains
            .get(name)
            .ok_or_else(|| ApiError::NotFound(format!("unknown domain '{}'", name)))
    }

    /// Names of the served domains, sorted.
    pub fn domain_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.domains.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
