//! Client configuration.

use std::time::Duration;

use anyhow::Result;

/// API base URL used when `RESONA_API_URL` is unset.
const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Per-request wall-clock budget in milliseconds.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    pub api_url: String,

    /// Wall-clock budget for a single request.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("RESONA_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_ms: u64 = std::env::var("RESONA_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}
