//! HTTP utilities for Guacamole REST API calls

use super::types::ApiError;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for Guacamole API calls
#[derive(Clone)]
pub struct GuacHttpClient {
    client: Client,
}

impl GuacHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration, disable_tls_verification: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("guacamole-provider/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .danger_accept_invalid_certs(disable_tls_verification)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request and decode the JSON body
    pub async fn get<T: DeserializeOwned>(&self, url: &str, token: Option<&str>) -> Result<T> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.query(&[("token", token)]);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(match serde_json::from_str::<ApiError>(&body) {
                Ok(api_error) if !api_error.message.is_empty() => {
                    anyhow::anyhow!("API request failed: {} - {}", status, api_error.message)
                }
                _ => anyhow::anyhow!("API request failed: {}", status),
            });
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

/// Prefix of every non-2xx error produced by [`GuacHttpClient::get`]
const API_FAILURE_PREFIX: &str = "API request failed: ";

/// HTTP status of the first API failure in the error chain
fn api_failure_status(error: &anyhow::Error) -> Option<u16> {
    error.chain().find_map(|cause| {
        let message = cause.to_string();
        let rest = message.strip_prefix(API_FAILURE_PREFIX)?;
        rest.get(..3)?.parse().ok()
    })
}

/// Format a Guacamole API error for display. Errors that are not HTTP
/// failures pass through unchanged.
pub fn format_guac_error(error: &anyhow::Error) -> String {
    let error_str = format!("{:#}", error);

    match api_failure_status(error) {
        Some(401) => "Authentication failed. Check the Guacamole auth token.".to_string(),
        Some(403) => "Permission denied. The token's user cannot read this object.".to_string(),
        Some(404) => format!("Not found. {}", error_str),
        Some(500) | Some(503) => {
            "Guacamole service temporarily unavailable. Please try again.".to_string()
        }
        _ => error_str,
    }
}
