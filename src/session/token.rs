//! Bearer token storage with cookie-equivalent lifetime semantics.
//!
//! The web frontend kept the session token in an `auth-token` cookie with a
//! seven-day max-age. This store reproduces that lifetime on the client: an
//! in-memory cell for embedded use and tests, or a JSON file under the data
//! directory when the token must outlive the process. Expired tokens read
//! back as absent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl StoredToken {
    fn is_live(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// Shared handle to the session token.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<StoredToken>>>,
    path: Option<PathBuf>,
    ttl: Duration,
}

impl TokenStore {
    /// In-memory store with the given time-to-live.
    pub fn in_memory(ttl_days: i64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            path: None,
            ttl: Duration::days(ttl_days),
        }
    }

    /// File-backed store at `<data_dir>/<cookie_name>.json`.
    ///
    /// An existing file is loaded eagerly; expired or unreadable entries are
    /// discarded.
    pub fn persistent(data_dir: &Path, cookie_name: &str, ttl_days: i64) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
        let path = data_dir.join(format!("{cookie_name}.json"));

        let initial = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<StoredToken>(&raw).ok())
            .filter(StoredToken::is_live);

        Ok(Self {
            inner: Arc::new(RwLock::new(initial)),
            path: Some(path),
            ttl: Duration::days(ttl_days),
        })
    }

    /// Current token, if present and not expired.
    pub fn get(&self) -> Option<String> {
        let guard = self.inner.read();
        match guard.as_ref() {
            Some(stored) if stored.is_live() => Some(stored.token.clone()),
            _ => None,
        }
    }

    /// True when a live token is present.
    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }

    /// Store a new token, stamping a fresh expiry.
    pub fn set(&self, token: impl Into<String>) {
        let stored = StoredToken {
            token: token.into(),
            expires_at: Utc::now() + self.ttl,
        };
        if let Some(path) = &self.path {
            if let Err(e) = write_token_file(path, &stored) {
                warn!(error = %e, "failed to persist session token");
            }
        }
        *self.inner.write() = Some(stored);
    }

    /// Drop the token and its persisted copy.
    pub fn clear(&self) {
        *self.inner.write() = None;
        if let Some(path) = &self.path {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(error = %e, "failed to remove persisted session token");
                }
            }
        }
    }
}

fn write_token_file(path: &Path, stored: &StoredToken) -> Result<()> {
    let raw = serde_json::to_string(stored)?;
    std::fs::write(path, raw)
        .with_context(|| format!("Failed to write token file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear_roundtrip() {
        let store = TokenStore::in_memory(7);
        assert!(store.get().is_none());
        assert!(!store.is_set());

        store.set("abc123");
        assert_eq!(store.get().as_deref(), Some("abc123"));
        assert!(store.is_set());

        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn clones_share_state() {
        let store = TokenStore::in_memory(7);
        let other = store.clone();
        store.set("shared");
        assert_eq!(other.get().as_deref(), Some("shared"));
    }

    #[test]
    fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::persistent(dir.path(), "auth-token", 7).unwrap();
        store.set("durable");

        let reopened = TokenStore::persistent(dir.path(), "auth-token", 7).unwrap();
        assert_eq!(reopened.get().as_deref(), Some("durable"));

        reopened.clear();
        let after_clear = TokenStore::persistent(dir.path(), "auth-token", 7).unwrap();
        assert!(after_clear.get().is_none());
    }

    #[test]
    fn expired_token_reads_back_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth-token.json");
        let stale = StoredToken {
            token: "old".to_string(),
            expires_at: Utc::now() - Duration::days(1),
        };
        std::fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

        let store = TokenStore::persistent(dir.path(), "auth-token", 7).unwrap();
        assert!(store.get().is_none());
        assert!(!store.is_set());
    }

    #[test]
    fn garbage_token_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("auth-token.json"), "not json").unwrap();

        let store = TokenStore::persistent(dir.path(), "auth-token", 7).unwrap();
        assert!(store.get().is_none());
    }
}
