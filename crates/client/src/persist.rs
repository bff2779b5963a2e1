//! Injected persistence for the session's durable subset.
//!
//! Only the session's `user` field is durable, stored as a `{ "user": ... }`
//! JSON record; `is_loading` and `error` are process-local. A second
//! ephemeral artifact, the pending wallet, belongs to the wallet-connect
//! handshake and is cleared on logout.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::User;

/// File name of the durable session record.
const SESSION_FILE: &str = "session.json";

/// File name of the ephemeral wallet-connect artifact.
const PENDING_WALLET_FILE: &str = "pending_wallet";

/// Durable storage for the session's `user` field and the pending-wallet
/// artifact.
pub trait SessionPersistence: Send + Sync {
    /// Restore the persisted user, if any.
    fn load_user(&self) -> Result<Option<User>>;

    /// Persist the user record.
    fn save_user(&self, user: &User) -> Result<()>;

    /// Remove the persisted user record.
    fn clear_user(&self) -> Result<()>;

    /// Stash a wallet address mid-handshake.
    fn set_pending_wallet(&self, wallet: &str) -> Result<()>;

    /// Read and remove the stashed wallet address.
    fn take_pending_wallet(&self) -> Result<Option<String>>;

    /// Drop the stashed wallet address, if any.
    fn clear_pending_wallet(&self) -> Result<()>;
}

/// On-disk layout of the session record.
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    user: Option<User>,
}

/// JSON-file persistence rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Store rooted at an explicit directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `~/.resona`.
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(Self::new(home.join(".resona")))
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn pending_wallet_path(&self) -> PathBuf {
        self.dir.join(PENDING_WALLET_FILE)
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Could not create {}", self.dir.display()))
    }
}

impl SessionPersistence for FileSessionStore {
    fn load_user(&self) -> Result<Option<User>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let record: SessionRecord = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt session record at {}", path.display()))?;

        Ok(record.user)
    }

    fn save_user(&self, user: &User) -> Result<()> {
        self.ensure_dir()?;

        let record = SessionRecord {
            user: Some(user.clone()),
        };
        let content = serde_json::to_string_pretty(&record)?;
        fs::write(self.session_path(), content)?;

        Ok(())
    }

    fn clear_user(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn set_pending_wallet(&self, wallet: &str) -> Result<()> {
        self.ensure_dir()?;
        fs::write(self.pending_wallet_path(), wallet)?;
        Ok(())
    }

    fn take_pending_wallet(&self) -> Result<Option<String>> {
        let path = self.pending_wallet_path();
        if !path.exists() {
            return Ok(None);
        }

        let wallet = fs::read_to_string(&path)?;
        fs::remove_file(&path)?;

        Ok(Some(wallet))
    }

    fn clear_pending_wallet(&self) -> Result<()> {
        let path = self.pending_wallet_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory persistence for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<User>>,
    pending_wallet: Mutex<Option<String>>,
}

impl MemorySessionStore {
    fn user_slot(&self) -> Result<std::sync::MutexGuard<'_, Option<User>>> {
        self.user.lock().map_err(|_| anyhow!("session slot poisoned"))
    }

    fn wallet_slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.pending_wallet
            .lock()
            .map_err(|_| anyhow!("pending wallet slot poisoned"))
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_user(&self) -> Result<Option<User>> {
        Ok(self.user_slot()?.clone())
    }

    fn save_user(&self, user: &User) -> Result<()> {
        *self.user_slot()? = Some(user.clone());
        Ok(())
    }

    fn clear_user(&self) -> Result<()> {
        *self.user_slot()? = None;
        Ok(())
    }

    fn set_pending_wallet(&self, wallet: &str) -> Result<()> {
        *self.wallet_slot()? = Some(wallet.to_string());
        Ok(())
    }

    fn take_pending_wallet(&self) -> Result<Option<String>> {
        Ok(self.wallet_slot()?.take())
    }

    fn clear_pending_wallet(&self) -> Result<()> {
        *self.wallet_slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: "u-1".to_string(),
            username: "alice".to_string(),
            wallet: "0xabc".to_string(),
            profile_picture: None,
            banner_image: None,
            followers: 0,
            following: None,
            bio: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        assert!(store.load_user().unwrap().is_none());

        let user = sample_user();
        store.save_user(&user).unwrap();
        assert_eq!(store.load_user().unwrap(), Some(user));

        store.clear_user().unwrap();
        assert!(store.load_user().unwrap().is_none());

        // Clearing an already-empty store is fine.
        store.clear_user().unwrap();
    }

    #[test]
    fn test_file_store_record_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        store.save_user(&sample_user()).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(SESSION_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["user"]["username"], "alice");
        assert_eq!(value["user"]["wallet"], "0xabc");
    }

    #[test]
    fn test_file_store_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        std::fs::write(dir.path().join(SESSION_FILE), "not json").unwrap();
        assert!(store.load_user().is_err());
    }

    #[test]
    fn test_pending_wallet_take_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        assert!(store.take_pending_wallet().unwrap().is_none());

        store.set_pending_wallet("0xfeed").unwrap();
        assert_eq!(store.take_pending_wallet().unwrap().as_deref(), Some("0xfeed"));
        assert!(store.take_pending_wallet().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::default();

        let user = sample_user();
        store.save_user(&user).unwrap();
        assert_eq!(store.load_user().unwrap(), Some(user));

        store.set_pending_wallet("0xfeed").unwrap();
        store.clear_pending_wallet().unwrap();
        assert!(store.take_pending_wallet().unwrap().is_none());

        store.clear_user().unwrap();
        assert!(store.load_user().unwrap().is_none());
    }
}
