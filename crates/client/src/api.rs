//! Domain operations against the Resona platform API.
//!
//! Each operation builds a request, runs it through the
//! [`RequestExecutor`](crate::http::RequestExecutor), interprets the
//! response, and on failure emits at most one user notification before
//! returning the classified error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::{ClientError, USER_NOT_FOUND};
use crate::http::{interpret, RequestExecutor};
use crate::notify::Notifier;
use crate::session::User;

/// Wire shape of a user record as the auth endpoints return it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    id: String,
    username: String,
    wallet_address: String,
    #[serde(default)]
    profile_picture: Option<String>,
    #[serde(default)]
    banner_image: Option<String>,
    #[serde(default)]
    followers: i64,
    #[serde(default)]
    following: Option<i64>,
    #[serde(default)]
    bio: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<WireUser> for User {
    fn from(wire: WireUser) -> Self {
        User {
            id: wire.id,
            username: wire.username,
            wallet: wire.wallet_address,
            profile_picture: wire.profile_picture,
            banner_image: wire.banner_image,
            followers: wire.followers,
            following: wire.following,
            bio: wire.bio,
            created_at: wire.created_at,
        }
    }
}

/// Envelope wrapping the user payload on auth endpoints.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: WireUser,
}

/// Profile payload for `GET /users/{username}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    /// Server-assigned identifier.
    pub id: String,

    /// Profile username.
    pub username: String,

    /// Wallet address, when the profile exposes one.
    #[serde(default)]
    pub wallet_address: Option<String>,

    /// Avatar image URL.
    #[serde(default)]
    pub profile_picture: Option<String>,

    /// Banner image URL.
    #[serde(default)]
    pub banner_image: Option<String>,

    /// Follower count.
    #[serde(default)]
    pub followers: i64,

    /// Following count.
    #[serde(default)]
    pub following: Option<i64>,

    /// Profile bio.
    #[serde(default)]
    pub bio: Option<String>,

    /// Uploaded tracks. Track modelling is outside this crate's scope.
    #[serde(default)]
    pub tracks: Vec<serde_json::Value>,

    /// Account creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// HTTP client for the Resona platform API.
#[derive(Clone)]
pub struct ApiClient {
    executor: RequestExecutor,
    config: ClientConfig,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a client over the configured base URL.
    pub fn new(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            executor: RequestExecutor::new(),
            config,
            notifier,
        }
    }

    /// Register a new account. `POST /auth/register`
    pub async fn register(&self, username: &str, wallet_address: &str) -> Result<User, ClientError> {
        let body = json!({ "username": username, "walletAddress": wallet_address });

        match self.request::<AuthResponse>(Method::POST, "/auth/register", Some(body)).await {
            Ok(response) => Ok(response.user.into()),
            Err(e) => {
                tracing::warn!(username = %username, error = %e.message(), "Registration failed");

                let message = match &e {
                    ClientError::Network(message) => message.clone(),
                    ClientError::Api { message, .. } => message.clone(),
                    ClientError::Unknown(_) => "Failed to register. Please try again.".to_string(),
                };
                self.notifier.error(&message);

                Err(e)
            }
        }
    }

    /// Log in with a wallet address. `POST /auth/login`
    ///
    /// A 404 is re-labeled with the [`USER_NOT_FOUND`] sentinel and returned
    /// without a notification; the caller decides how to surface a missing
    /// account.
    pub async fn login(&self, wallet_address: &str) -> Result<User, ClientError> {
        let body = json!({ "walletAddress": wallet_address });

        match self.request::<AuthResponse>(Method::POST, "/auth/login", Some(body)).await {
            Ok(response) => Ok(response.user.into()),
            Err(ClientError::Api { status: 404, .. }) => Err(ClientError::Api {
                status: 404,
                message: USER_NOT_FOUND.to_string(),
            }),
            Err(e) => {
                tracing::warn!(error = %e.message(), "Login failed");

                let message = match &e {
                    ClientError::Network(message) => message.clone(),
                    _ => "Failed to login. Please try again.".to_string(),
                };
                self.notifier.error(&message);

                Err(e)
            }
        }
    }

    /// Fetch a public profile. `GET /users/{username}`
    pub async fn fetch_profile(&self, username: &str) -> Result<ProfileData, ClientError> {
        let path = format!("/users/{username}");

        match self.request::<ProfileData>(Method::GET, &path, None).await {
            Ok(profile) => Ok(profile),
            Err(e) => {
                tracing::warn!(username = %username, error = %e.message(), "Profile fetch failed");

                let message = match &e {
                    ClientError::Network(message) => message.clone(),
                    _ => "Failed to load profile. Please try again.".to_string(),
                };
                self.notifier.error(&message);

                Err(e)
            }
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.config.api_url.trim_end_matches('/'), path);

        let response = self
            .executor
            .execute(method, &url, body, HeaderMap::new(), self.config.request_timeout)
            .await?;

        interpret(response).await
    }
}
