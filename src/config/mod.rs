//! Configuration loading and management
//!
//! ```yaml
//! backend:
//!   url: https://project.example.co
//!   anon_key: public-anon-key
//! log_filter: agency_sync=debug
//! recent_limit: 3
//! ```

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable overriding `backend.url`
pub const ENV_BACKEND_URL: &str = "AGENCY_BACKEND_URL";
/// Environment variable overriding `backend.anon_key`
pub const ENV_ANON_KEY: &str = "AGENCY_ANON_KEY";
/// Environment variable overriding `log_filter`
pub const ENV_LOG: &str = "AGENCY_LOG";

fn default_log_filter() -> String {
    "agency_sync=info".to_string()
}

fn default_recent_limit() -> usize {
    3
}

/// Connection settings for the hosted table store and auth service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, without the `/rest/v1` suffix
    #[serde(default)]
    pub url: String,

    /// Public anon key sent as `apikey` on every request
    #[serde(default)]
    pub anon_key: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    /// `EnvFilter` directives for the tracing subscriber
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Number of rows in the dashboard's recent lists
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            log_filter: default_log_filter(),
            recent_limit: default_recent_limit(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply `AGENCY_*` environment variables on top of the loaded values
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.backend.url = url;
        }
        if let Some(key) = lookup(ENV_ANON_KEY) {
            self.backend.anon_key = key;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
        self
    }

    /// Backend settings, or the first missing one
    pub fn require_backend(&self) -> Result<&BackendConfig, ConfigError> {
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::Missing("backend.url"));
        }
        if self.backend.anon_key.trim().is_empty() {
            return Err(ConfigError::Missing("backend.anon_key"));
        }
        Ok(&self.backend)
    }

    /// Filter built from `log_filter`, falling back to `info` when unparsable
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Install a formatting subscriber for the process
    ///
    /// Does nothing when a global subscriber is already set.
    pub fn init_tracing(&self) {
        let installed = tracing_subscriber::registry()
            .with(self.env_filter())
            .with(tracing_subscriber::fmt::layer())
            .try_init();

        if installed.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    }
}
