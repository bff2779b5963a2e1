//! Session state machine and store.
//!
//! One [`SessionStore`] exists per running client and is the sole source of
//! truth for "is someone authenticated". State lives in a `tokio::sync::watch`
//! channel: every mutation goes through an enumerated entry point, and
//! consumers read snapshots or subscribe for changes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::notify::Notifier;
use crate::persist::SessionPersistence;

/// An authenticated platform user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier.
    pub id: String,

    /// Display username.
    pub username: String,

    /// Wallet address bound to the account.
    pub wallet: String,

    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,

    /// Banner image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,

    /// Follower count.
    pub followers: i64,

    /// Following count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<i64>,

    /// Profile bio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// Authentication state of the running client.
///
/// Collapses the `Anonymous / Authenticating / Authenticated / Failed`
/// machine into one record: `is_loading` means Authenticating, a present
/// `user` means Authenticated, a present `error` records the last failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// The authenticated user, if any.
    pub user: Option<User>,

    /// True while exactly one authentication operation is in flight.
    pub is_loading: bool,

    /// Last failure reason, for introspection. Never persisted.
    pub error: Option<String>,
}

/// Process-wide authentication state with enumerated mutation entry points.
pub struct SessionStore {
    state: watch::Sender<Session>,
    api: ApiClient,
    persistence: Arc<dyn SessionPersistence>,
    notifier: Arc<dyn Notifier>,
}

impl SessionStore {
    /// Create a store, restoring any persisted user before the first
    /// operation runs. A corrupt or unreadable record degrades to an
    /// anonymous session.
    pub fn new(
        config: ClientConfig,
        persistence: Arc<dyn SessionPersistence>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let user = match persistence.load_user() {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore persisted session, starting anonymous");
                None
            }
        };

        if let Some(user) = &user {
            tracing::debug!(username = %user.username, "Restored persisted session");
        }

        let (state, _) = watch::channel(Session {
            user,
            is_loading: false,
            error: None,
        });

        Self {
            state,
            api: ApiClient::new(config, notifier.clone()),
            persistence,
            notifier,
        }
    }

    /// Current session state.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// The shared API client, for flows outside the store's own operations.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Log in with a locally synthesized demo identity. No network call.
    pub fn login_demo(&self) {
        if !self.begin_auth() {
            tracing::warn!("Authentication already in progress, ignoring demo login");
            return;
        }

        let user = demo_user();
        self.persist_user(Some(&user));
        self.state.send_modify(|session| {
            session.user = Some(user);
            session.is_loading = false;
        });

        self.notifier.success("Welcome to the demo account!");
    }

    /// Register a new account and authenticate as it.
    ///
    /// The API client owns the user-facing notification for failures; this
    /// store records the error for introspection and hands the classified
    /// error back to the caller without a second notification.
    pub async fn register_new_user(
        &self,
        username: &str,
        wallet_address: &str,
    ) -> Result<User, ClientError> {
        if !self.begin_auth() {
            return Err(ClientError::Unknown(
                "Another authentication operation is in progress".to_string(),
            ));
        }

        match self.api.register(username, wallet_address).await {
            Ok(user) => {
                self.persist_user(Some(&user));
                self.state.send_modify(|session| {
                    session.user = Some(user.clone());
                    session.is_loading = false;
                });

                tracing::info!(username = %username, "Registered and authenticated");
                Ok(user)
            }
            Err(e) => {
                self.state.send_modify(|session| {
                    session.error = Some(e.message().to_string());
                    session.is_loading = false;
                });

                Err(e)
            }
        }
    }

    /// Clear the session and any pending wallet-connect artifact.
    ///
    /// Idempotent: logging out while anonymous still succeeds and still
    /// emits the success notification.
    pub fn logout(&self) {
        if let Err(e) = self.persistence.clear_pending_wallet() {
            tracing::warn!(error = %e, "Failed to clear pending wallet");
        }

        self.persist_user(None);
        self.state.send_modify(|session| {
            *session = Session::default();
        });

        self.notifier.success("Logged out successfully");
    }

    /// Replace the session user (wallet-connect callback flows).
    pub fn set_user(&self, user: Option<User>) {
        self.persist_user(user.as_ref());
        self.state.send_modify(|session| session.user = user);
    }

    /// Mark an external authentication flow as in flight (or not).
    pub fn set_loading(&self, loading: bool) {
        self.state.send_modify(|session| session.is_loading = loading);
    }

    /// Record (or clear) the last failure reason.
    pub fn set_error(&self, error: Option<String>) {
        self.state.send_modify(|session| session.error = error);
    }

    /// Atomically enter the Authenticating state.
    ///
    /// Returns false when another authentication operation already holds
    /// `is_loading`, leaving the session untouched.
    fn begin_auth(&self) -> bool {
        self.state.send_if_modified(|session| {
            if session.is_loading {
                false
            } else {
                session.is_loading = true;
                session.error = None;
                true
            }
        })
    }

    /// Keep the durable record in sync with the session's `user` field.
    /// Persistence failures degrade to a warning; the in-memory session
    /// stays authoritative.
    fn persist_user(&self, user: Option<&User>) {
        let result = match user {
            Some(user) => self.persistence.save_user(user),
            None => self.persistence.clear_user(),
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist session");
        }
    }
}

/// Fixed demo identity with a random wallet placeholder.
fn demo_user() -> User {
    let suffix = uuid::Uuid::new_v4().simple().to_string();

    User {
        id: "demo-user".to_string(),
        username: "Demo User".to_string(),
        wallet: format!("0xdemo{}", &suffix[..13]),
        profile_picture: Some("https://api.dicebear.com/7.x/avatars/svg?seed=demo".to_string()),
        banner_image: Some(
            "https://images.unsplash.com/photo-1511671782779-c97d3d27a1d4?auto=format&fit=crop&w=1920&q=80"
                .to_string(),
        ),
        followers: 0,
        following: Some(0),
        bio: Some("Demo Account".to_string()),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_user_wallet_placeholder() {
        let user = demo_user();
        assert!(user.wallet.starts_with("0xdemo"));
        assert_eq!(user.wallet.len(), "0xdemo".len() + 13);
        assert_eq!(user.id, "demo-user");
        assert_eq!(user.followers, 0);

        // Wallets are random placeholders, not stable values.
        assert_ne!(user.wallet, demo_user().wallet);
    }

    #[test]
    fn test_session_default_is_anonymous() {
        let session = Session::default();
        assert!(session.user.is_none());
        assert!(!session.is_loading);
        assert!(session.error.is_none());
    }

    #[test]
    fn test_user_wire_format_is_camel_case() {
        let user = demo_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("profilePicture").is_some());
        assert!(json.get("created_at").is_none());

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_user_optional_fields_default() {
        let json = serde_json::json!({
            "id": "u1",
            "username": "alice",
            "wallet": "0xabc",
            "followers": 3,
            "createdAt": "2025-11-02T10:00:00Z"
        });

        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.bio.is_none());
        assert!(user.following.is_none());
    }
}
