//! Client-held session token.
//!
//! The token lives in the per-login runtime directory when the platform has
//! one, so it disappears with the session. Elsewhere it falls back to the
//! cache directory. The file is private to the user on Unix.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dayboard_core::write_atomic;
use tracing::debug;

const SESSION_FILE: &str = "session-token";

/// Default location of the session token file.
pub fn default_session_path() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("dayboard")
        .join(SESSION_FILE)
}

/// A token file the poller can fall back to.
#[derive(Debug, Clone)]
pub struct SessionToken {
    path: PathBuf,
}

impl SessionToken {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored token, if any. Blank files count as absent.
    pub fn get(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Stores `token`, replacing any previous one. The file is created
    /// owner-only.
    pub fn set(&self, token: &str) -> io::Result<()> {
        write_atomic(&self.path, token.trim().as_bytes(), true)?;
        debug!(path = %self.path.display(), "session token stored");
        Ok(())
    }

    /// Removes the token. Removing an absent token is not an error.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session token removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
