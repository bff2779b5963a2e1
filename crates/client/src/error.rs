//! Classified error taxonomy for API access.

use thiserror::Error;

/// Message carried when a request exceeds its time budget.
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";

/// Message carried when a transport failure looks like a dead local network.
pub const OFFLINE_MESSAGE: &str =
    "You appear to be offline. Please check your internet connection.";

/// Generic transport failure message.
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection";

/// Sentinel message for a login against an unknown wallet.
pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";

/// Errors produced by the request layer and API client.
///
/// Callers drive control flow by matching on the variant, e.g.
/// `Api { status: 404, .. }` for a missing account.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Transport failure: timeout, offline, connection dropped.
    #[error("{0}")]
    Network(String),

    /// The server rejected the request.
    #[error("{message}")]
    Api {
        /// HTTP status code returned by the server.
        status: u16,
        /// Server-provided message, or the generic fallback.
        message: String,
    },

    /// Anything else, including malformed payloads.
    #[error("{0}")]
    Unknown(String),
}

impl ClientError {
    /// True when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }

    /// The user-facing message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            ClientError::Network(message) | ClientError::Unknown(message) => message,
            ClientError::Api { message, .. } => message,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Unknown(e.to_string())
    }
}
