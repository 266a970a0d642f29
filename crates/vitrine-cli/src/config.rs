//! Configuration and store resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;

use vitrine::{ContentDirectory, DirectoryConfig, Domain, Store, StoreUrl};

use crate::cli::GlobalArgs;

/// Get the default configuration file path.
fn config_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "vitrine").context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.json"))
}

/// Load the directory configuration.
///
/// An explicit `--config` path must exist; the default path may be absent,
/// in which case the built-in defaults apply.
pub fn load_config(explicit: Option<&Path>) -> Result<DirectoryConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => config_path()?,
    };

    let config = DirectoryConfig::load(&path)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Everything a command needs to talk to the store.
pub struct Workspace {
    pub config: DirectoryConfig,
    pub store: Store,
}

impl Workspace {
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let config = load_config(global.config.as_deref())?;

        let raw = global
            .store
            .as_deref()
            .context("No store configured. Pass --store or set VITRINE_STORE.")?;
        let url = StoreUrl::new(raw).context("Invalid store URL")?;
        let store = Store::open(url, global.token.as_deref(), config.request_timeout())
            .context("Failed to open store")?;

        Ok(Self { config, store })
    }

    pub fn domain(&self, name: &str) -> Result<Domain> {
        let domains = self.config.domains()?;
        let known: Vec<String> = domains.iter().map(|d| d.name().to_string()).collect();
        domains
            .into_iter()
            .find(|d| d.name() == name)
            .with_context(|| format!("Unknown domain '{}' (known: {})", name, known.join(", ")))
    }

    pub fn directory(&self) -> ContentDirectory<Store> {
        ContentDirectory::new(self.store.clone(), &self.config)
    }
}
