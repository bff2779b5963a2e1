//! Resona client core.
//!
//! Session state machine and hardened API access for the Resona platform.
//!
//! This crate provides:
//! - HTTP request executor with a wall-clock time budget and offline
//!   classification
//! - Typed response interpretation into the [`ClientError`] taxonomy
//! - API client for the register / login / profile operations
//! - Persisted session store with watch-based subscriptions

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod notify;
pub mod persist;
pub mod session;

pub use api::{ApiClient, ProfileData};
pub use config::ClientConfig;
pub use error::ClientError;
pub use notify::{Notifier, TracingNotifier};
pub use persist::{FileSessionStore, MemorySessionStore, SessionPersistence};
pub use session::{Session, SessionStore, User};
