//! Guacamole Client
//!
//! Read-only client for the Guacamole REST API, combining the HTTP layer,
//! the data source base URL and the auth token.

use super::http::GuacHttpClient;
use super::path;
use super::types::{Connection, ConnectionGroup, ROOT_GROUP};
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`GuacClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Guacamole web application URL, e.g. `https://gw.example.com/guacamole`
    pub url: String,
    /// Authentication provider data source, e.g. `mysql` or `postgresql`
    pub data_source: String,
    /// Auth token issued by `POST /api/tokens`
    pub token: Option<String>,
    pub disable_tls_verification: bool,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(url: &str, data_source: &str) -> Self {
        Self {
            url: url.to_string(),
            data_source: data_source.to_string(),
            token: None,
            disable_tls_verification: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

/// Main Guacamole client
#[derive(Clone)]
pub struct GuacClient {
    pub http: GuacHttpClient,
    base_url: String,
    token: Option<String>,
}

impl GuacClient {
    /// Create a new client for one data source
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let parsed = Url::parse(&config.url)
            .with_context(|| format!("Invalid Guacamole URL '{}'", config.url))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            bail!(
                "Guacamole URL must use http or https; got '{}://'",
                parsed.scheme()
            );
        }
        if config.data_source.is_empty() {
            bail!("Guacamole data source must not be empty");
        }

        let http = GuacHttpClient::new(config.timeout, config.disable_tls_verification)?;
        let base_url = format!(
            "{}/api/session/data/{}",
            config.url.trim_end_matches('/'),
            urlencoding::encode(&config.data_source)
        );

        Ok(Self {
            http,
            base_url,
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a data source URL from path segments, encoding each one
    fn data_url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.data_url(segments);
        self.http.get(&url, self.token.as_deref()).await
    }

    // =========================================================================
    // Connections
    // =========================================================================

    /// Read a connection and its parameters by identifier
    pub async fn read_connection(&self, identifier: &str) -> Result<Connection> {
        let mut connection: Connection = self
            .get(&["connections", identifier])
            .await
            .with_context(|| format!("Failed to read connection '{}'", identifier))?;

        let parameters: HashMap<String, Option<String>> = self
            .get(&["connections", identifier, "parameters"])
            .await
            .with_context(|| format!("Failed to read parameters of connection '{}'", identifier))?;

        connection.parameters = parameters
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();

        Ok(connection)
    }

    /// Read a connection by its group path, e.g. `/ops/bastion`
    pub async fn read_connection_by_path(&self, connection_path: &str) -> Result<Connection> {
        let tree = self.connection_tree().await?;
        let identifier = path::find_connection(&tree, connection_path)?.identifier.clone();
        tracing::debug!("Path '{}' resolved to connection {}", connection_path, identifier);
        self.read_connection(&identifier).await
    }

    // =========================================================================
    // Connection groups
    // =========================================================================

    /// Read a connection group with its children
    pub async fn read_connection_group(&self, identifier: &str) -> Result<ConnectionGroup> {
        self.get(&["connectionGroups", identifier, "tree"])
            .await
            .with_context(|| format!("Failed to read connection group '{}'", identifier))
    }

    /// Read a connection group by path; `/` is the root group
    pub async fn read_connection_group_by_path(&self, group_path: &str) -> Result<ConnectionGroup> {
        let tree = self.connection_tree().await?;
        let group = path::find_group(&tree, group_path)?;
        tracing::debug!("Path '{}' resolved to connection group {}", group_path, group.identifier);
        Ok(group.clone())
    }

    /// The whole tree visible to the token's user
    pub async fn connection_tree(&self) -> Result<ConnectionGroup> {
        self.read_connection_group(ROOT_GROUP).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let client = GuacClient::new(&ClientConfig::new("https://gw.example.com/guacamole/", "mysql")).unwrap();
        assert_eq!(
            client.base_url(),
            "https://gw.example.com/guacamole/api/session/data/mysql"
        );
    }

    #[test]
    fn test_data_url_encodes_segments() {
        let client = GuacClient::new(&ClientConfig::new("http://localhost:8080", "mysql")).unwrap();
        assert_eq!(
            client.data_url(&["connections", "a b/c"]),
            "http://localhost:8080/api/session/data/mysql/connections/a%20b%2Fc"
        );
    }

    #[test]
    fn test_rejects_invalid_urls() {
        assert!(GuacClient::new(&ClientConfig::new("not a url", "mysql")).is_err());
        assert!(GuacClient::new(&ClientConfig::new("ftp://gw.example.com", "mysql")).is_err());
        assert!(GuacClient::new(&ClientConfig::new("https://gw.example.com", "")).is_err());
    }

    #[test]
    fn test_url_errors_survive_display_formatting() {
        let err = GuacClient::new(&ClientConfig::new("10.0.0.5:5000/guacamole", "mysql"))
            .err()
            .unwrap();
        let shown = crate::guacamole::http::format_guac_error(&err);
        assert!(shown.starts_with("Invalid Guacamole URL '10.0.0.5:5000/guacamole'"));
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client =
            GuacClient::new(&ClientConfig::new("https://gw.example.com", "mysql").with_token("")).unwrap();
        assert!(client.token.is_none());
    }
}
