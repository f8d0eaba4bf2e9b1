use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Catalog path cannot be empty")]
    EmptyCatalogPath,

    #[error("Store URL cannot be empty")]
    EmptyStoreUrl,
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

/// Connection parameters for the Redis-over-REST cursor store
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Base URL of the REST endpoint
    pub url: String,
    /// Bearer token sent with every store request
    pub token: String,
}

impl StoreConfig {
    /// Resolves store parameters from the environment. Both the URL and the
    /// token must be present; `KV_*` variables win over the `UPSTASH_*`
    /// fallbacks.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let url = lookup("KV_REST_API_URL").or_else(|| lookup("UPSTASH_REDIS_REST_URL"))?;
        let token = lookup("KV_REST_API_TOKEN").or_else(|| lookup("UPSTASH_REDIS_REST_TOKEN"))?;
        Some(StoreConfig { url, token })
    }
}

/// Statsd sink parameters
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

/// Service configuration loaded from a YAML file
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    /// Path to the agent catalog JSON document
    pub catalog_path: PathBuf,
    /// Store parameters; the environment takes precedence (see
    /// [`Config::resolved_store`])
    pub store: Option<StoreConfig>,
    pub metrics: Option<MetricsConfig>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Validates the service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listener.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.catalog_path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyCatalogPath);
        }
        if let Some(store) = &self.store
            && store.url.is_empty()
        {
            return Err(ValidationError::EmptyStoreUrl);
        }
        Ok(())
    }

    /// Store parameters with environment variables taking precedence over
    /// the config file. `None` means persistence is unconfigured; requests
    /// will fail with a configuration error rather than skipping the store.
    pub fn resolved_store(&self) -> Option<StoreConfig> {
        StoreConfig::from_env().or_else(|| self.store.clone())
    }
}

/// Rotation overrides resolved from the process environment at startup.
///
/// The handler never reads the environment directly; this structure is built
/// once in `main` and passed in, so tests can exercise every combination
/// without mutating process state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    /// `RESET_INDEX=true`
    pub reset_index: bool,
    /// `RESTART_INDEX=true`, alias for the above
    pub restart_index: bool,
    /// Raw `START_INDEX` value, parsed per request alongside the query
    pub start_index: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Exact match on "true"; "TRUE" or "1" do not fire.
        let is_true = |key: &str| lookup(key).as_deref() == Some("true");
        Overrides {
            reset_index: is_true("RESET_INDEX"),
            restart_index: is_true("RESTART_INDEX"),
            start_index: lookup("START_INDEX"),
        }
    }
}
