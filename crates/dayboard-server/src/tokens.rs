//! Single-slot bearer token storage.
//!
//! The relay holds at most one token: the latest one a client submitted.
//! It is kept in memory and mirrored to `token.json` so a restart resumes
//! refreshing without a new submission.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreResult;
use crate::persist::{read_json, write_json};

/// File name of the token document inside the data directory.
pub const TOKEN_FILE: &str = "token.json";

/// On-disk shape of the token slot. A cleared slot keeps the file with both
/// fields `null`; an empty or whitespace-only token reads as cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub stored_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    /// Drops a blank token.
    fn normalized(self) -> Self {
        match self.token {
            Some(ref token) if token.trim().is_empty() => Self::default(),
            _ => self,
        }
    }
}

/// Persisted token slot.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    record: RwLock<TokenRecord>,
}

impl TokenStore {
    /// Opens the store in `data_dir`, loading any previous token.
    ///
    /// An unreadable or corrupt file is treated as "no token".
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(TOKEN_FILE);
        let record = match read_json::<TokenRecord>(&path) {
            Ok(Some(record)) => {
                let record = record.normalized();
                if record.token.is_some() {
                    info!(path = %path.display(), "loaded stored token");
                }
                record
            }
            Ok(None) => {
                debug!(path = %path.display(), "no token file");
                TokenRecord::default()
            }
            Err(e) => {
                warn!(error = %e, "ignoring unreadable token file");
                TokenRecord::default()
            }
        };
        Self {
            path,
            record: RwLock::new(record),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current token, if any.
    pub fn get(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn has_token(&self) -> bool {
        self.read().token.is_some()
    }

    /// Returns a copy of the whole slot.
    pub fn record(&self) -> TokenRecord {
        self.read().clone()
    }

    /// Replaces the token. The file is written first; on failure the
    /// previous token stays in effect. A blank token clears the slot.
    pub fn store(&self, token: &str) -> StoreResult<()> {
        let record = TokenRecord {
            token: Some(token.to_string()),
            stored_at: Some(Utc::now()),
        }
        .normalized();
        write_json(&self.path, &record, true)?;
        if record.token.is_some() {
            info!("token stored");
        } else {
            info!("blank token submitted, slot cleared");
        }
        *self.write() = record;
        Ok(())
    }

    /// Drops the token if it is still `token`; a token submitted while the
    /// rejected one was in use is kept. Memory is cleared even if the file
    /// cannot be rewritten. Returns whether anything was dropped.
    pub fn clear_if_current(&self, token: &str) -> StoreResult<bool> {
        {
            let mut record = self.write();
            if record.token.as_deref() != Some(token) {
                debug!("rejected token already replaced, keeping the new one");
                return Ok(false);
            }
            *record = TokenRecord::default();
        }
        info!("token cleared");
        write_json(&self.path, &TokenRecord::default(), true)?;
        Ok(true)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, TokenRecord> {
        self.record.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, TokenRecord> {
        self.record.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn fresh_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path());
        assert!(store.get().is_none());
        assert!(!store.has_token());
        assert_eq!(store.record(), TokenRecord::default());
    }

    #[test]
    fn store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path());
        store.store("tok-123").unwrap();
        assert_eq!(store.get().as_deref(), Some("tok-123"));
        assert!(store.record().stored_at.is_some());

        let reopened = TokenStore::open(dir.path());
        assert_eq!(reopened.get().as_deref(), Some("tok-123"));
    }

    #[test]
    fn later_submission_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path());
        store.store("first").unwrap();
        store.store("second").unwrap();
        assert_eq!(TokenStore::open(dir.path()).get().as_deref(), Some("second"));
    }

    #[test]
    fn clear_writes_null_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path());
        store.store("tok").unwrap();
        assert!(store.clear_if_current("tok").unwrap());
        assert!(store.get().is_none());

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(on_disk, serde_json::json!({"token": null, "storedAt": null}));
    }

    #[test]
    fn replaced_token_survives_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path());
        store.store("old").unwrap();
        store.store("new").unwrap();
        assert!(!store.clear_if_current("old").unwrap());
        assert_eq!(TokenStore::open(dir.path()).get().as_deref(), Some("new"));
    }

    #[test]
    fn blank_token_on_disk_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TOKEN_FILE), r#"{"token":"","storedAt":null}"#).unwrap();
        let store = TokenStore::open(dir.path());
        assert!(!store.has_token());
        assert!(store.get().is_none());

        fs::write(dir.path().join(TOKEN_FILE), r#"{"token":"  \n","storedAt":null}"#).unwrap();
        assert!(!TokenStore::open(dir.path()).has_token());
    }

    #[test]
    fn storing_blank_token_clears_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path());
        store.store("tok").unwrap();
        store.store("   ").unwrap();
        assert!(!store.has_token());
        assert_eq!(TokenStore::open(dir.path()).record(), TokenRecord::default());
    }

    #[test]
    fn corrupt_file_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TOKEN_FILE), "garbage").unwrap();
        assert!(TokenStore::open(dir.path()).get().is_none());
    }

    #[test]
    fn reads_document_written_with_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(TOKEN_FILE),
            r#"{"token":"ya29.abc","storedAt":"2024-03-15T08:00:00.000Z"}"#,
        )
        .unwrap();
        let store = TokenStore::open(dir.path());
        assert_eq!(store.get().as_deref(), Some("ya29.abc"));
    }
}
