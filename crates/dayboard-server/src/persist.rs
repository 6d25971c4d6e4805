//! Whole-document JSON files written by temp file + rename.

use std::fs;
use std::io;
use std::path::Path;

use dayboard_core::write_atomic;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Reads `path`, returning `Ok(None)` if the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::read(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Replaces `path` with `value`. Readers see either the old or the new
/// document, never a partial one.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T, private: bool) -> StoreResult<()> {
    let content = serde_json::to_vec_pretty(value).map_err(StoreError::Serialize)?;
    write_atomic(path, &content, private).map_err(|e| StoreError::write(path, e))?;
    debug!(path = %path.display(), "wrote document");
    Ok(())
}
