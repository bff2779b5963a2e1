//! Hardened request execution.
//!
//! Wraps a shared `reqwest::Client` with a wall-clock time budget and
//! classifies transport and HTTP failures into [`ClientError`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, NETWORK_MESSAGE, OFFLINE_MESSAGE, TIMEOUT_MESSAGE};

/// Executes HTTP requests with a bounded time budget.
///
/// Every request carries `Content-Type: application/json` (caller headers
/// may override it explicitly) and session cookies via the client's cookie
/// store.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: reqwest::Client,
}

impl RequestExecutor {
    /// Create an executor with a cookie store so session cookies ride along.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Issue a request and wait for response headers within `timeout`.
    ///
    /// The in-flight request future is dropped when the budget expires, so
    /// neither a timer nor a connection outlives the call.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<Response, ClientError> {
        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        merged.extend(headers);

        let mut request = self.client.request(method, url).headers(merged);
        if let Some(body) = body {
            request = request.json(&body);
        }

        match tokio::time::timeout(timeout, request.send()).await {
            Err(_) => Err(ClientError::Network(TIMEOUT_MESSAGE.to_string())),
            Ok(Err(e)) => Err(classify_transport(&e)),
            Ok(Ok(response)) => Ok(response),
        }
    }
}

impl Default for RequestExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a transport failure onto the offline or generic network messages.
fn classify_transport(error: &reqwest::Error) -> ClientError {
    if error.is_timeout() {
        return ClientError::Network(TIMEOUT_MESSAGE.to_string());
    }

    if error.is_connect() {
        // Connection refused or unreachable: the local network is the most
        // likely culprit.
        return ClientError::Network(OFFLINE_MESSAGE.to_string());
    }

    tracing::debug!(error = %error, "Transport failure");
    ClientError::Network(NETWORK_MESSAGE.to_string())
}

/// Interpret an HTTP response: JSON payload on success, `Api` on failure.
///
/// A malformed body behind a success status is transport-level
/// ([`ClientError::Unknown`]), not domain-level.
pub async fn interpret<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(status, response).await);
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Unknown(format!("Malformed response body: {e}")))
}

/// Build the `Api` error for a non-success response, preferring the
/// server-provided `message` field over the generic fallback.
async fn error_from_response(status: StatusCode, response: Response) -> ClientError {
    let mut message = format!("HTTP error! status: {}", status.as_u16());

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);

    if is_json {
        if let Ok(body) = response.json::<serde_json::Value>().await {
            if let Some(server_message) = body.get("message").and_then(|m| m.as_str()) {
                message = server_message.to_string();
            }
        }
    }

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}
