//! Disk-backed single-slot event cache.
//!
//! There is no expiry: the last successful fetch is served until another one
//! replaces it.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use dayboard_core::Event;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreResult;
use crate::persist::{read_json, write_json};

/// File name of the cache document inside the data directory.
pub const EVENTS_FILE: &str = "events.json";

/// The cached fetch result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Event cache mirrored to `events.json`.
#[derive(Debug)]
pub struct EventCache {
    path: PathBuf,
    record: RwLock<CacheRecord>,
}

impl EventCache {
    /// Opens the cache in `data_dir`, loading the last stored fetch.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(EVENTS_FILE);
        let record = match read_json::<CacheRecord>(&path) {
            Ok(Some(record)) => {
                debug!(count = record.events.len(), "loaded cached events");
                record
            }
            Ok(None) => CacheRecord::default(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable events file");
                CacheRecord::default()
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

    /// Returns a copy of the cached record.
    pub fn snapshot(&self) -> CacheRecord {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// When the cache was last replaced, if ever.
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fetched_at
    }

    pub fn len(&self) -> usize {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the cached events, stamping them with the current time.
    ///
    /// The file is written before memory is swapped; if the write fails
    /// the previous content is still served.
    pub fn replace(&self, events: Vec<Event>) -> StoreResult<DateTime<Utc>> {
        let fetched_at = Utc::now();
        let record = CacheRecord {
            events,
            fetched_at: Some(fetched_at),
        };
        write_json(&self.path, &record, false)?;
        let count = record.events.len();
        *self.record.write().unwrap_or_else(PoisonError::into_inner) = record;
        info!(count, "stored calendar events");
        Ok(fetched_at)
    }
}
