//! Configuration Management
//!
//! Persistent defaults for the gateway connection, overridable from the
//! environment and the command line. The auth token is never written to disk.

use crate::guacamole::client::{ClientConfig, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_URL: &str = "GUACAMOLE_URL";
pub const ENV_DATA_SOURCE: &str = "GUACAMOLE_DATA_SOURCE";
pub const ENV_TOKEN: &str = "GUACAMOLE_TOKEN";

/// Data source used when none is configured
pub const DEFAULT_DATA_SOURCE: &str = "mysql";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Guacamole web application URL
    #[serde(default)]
    pub url: Option<String>,
    /// Authentication data source
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub disable_tls_verification: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Values supplied on the command line; they win over everything else
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub data_source: Option<String>,
    pub token: Option<String>,
    pub disable_tls_verification: bool,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("guacamole-provider").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Take the values given on the command line. Fields not given keep
    /// their saved value; without `--insecure` the saved TLS setting stays.
    pub fn merge_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = &overrides.url {
            self.url = Some(url.clone());
        }
        if let Some(data_source) = &overrides.data_source {
            self.data_source = Some(data_source.clone());
        }
        if overrides.timeout_secs.is_some() {
            self.timeout_secs = overrides.timeout_secs;
        }
        if overrides.disable_tls_verification {
            self.disable_tls_verification = true;
        }
    }

    /// Get effective URL (CLI > environment > config)
    pub fn effective_url(&self, overrides: &Overrides) -> Option<String> {
        overrides
            .url
            .clone()
            .or_else(|| env_var(ENV_URL))
            .or_else(|| self.url.clone())
    }

    /// Get effective data source (CLI > environment > config > default)
    pub fn effective_data_source(&self, overrides: &Overrides) -> String {
        overrides
            .data_source
            .clone()
            .or_else(|| env_var(ENV_DATA_SOURCE))
            .or_else(|| self.data_source.clone())
            .unwrap_or_else(|| DEFAULT_DATA_SOURCE.to_string())
    }

    /// Get effective token (CLI > environment)
    pub fn effective_token(&self, overrides: &Overrides) -> Option<String> {
        overrides.token.clone().or_else(|| env_var(ENV_TOKEN))
    }

    /// Build the client settings from all layers
    pub fn client_config(&self, overrides: &Overrides) -> Result<ClientConfig> {
        let url = self.effective_url(overrides).with_context(|| {
            format!("No Guacamole URL configured. Set {} or use --url", ENV_URL)
        })?;

        Ok(ClientConfig {
            url,
            data_source: self.effective_data_source(overrides),
            token: self.effective_token(overrides),
            disable_tls_verification: overrides.disable_tls_verification
                || self.disable_tls_verification,
            timeout: overrides
                .timeout_secs
                .or(self.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
