//! Local collection storage.
//!
//! Each collection is one JSON array in `<data_dir>/<collection>.json`,
//! rewritten wholesale on every change. Concurrent writers are last-write-wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dayboard_core::{CollectionKind, Record, write_atomic};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// A uniform list/add/update/delete interface over named collections.
pub trait RecordStore {
    /// All records of `collection`, in storage order.
    fn list<T>(&self, collection: CollectionKind) -> ClientResult<Vec<T>>
    where
        T: Record + DeserializeOwned;

    fn add<T>(&self, collection: CollectionKind, record: T) -> ClientResult<()>
    where
        T: Record + Serialize + DeserializeOwned;

    /// Replaces the record with the same id. Returns false if none exists.
    fn update<T>(&self, collection: CollectionKind, record: T) -> ClientResult<bool>
    where
        T: Record + Serialize + DeserializeOwned;

    /// Returns false if no record has `id`.
    fn delete<T>(&self, collection: CollectionKind, id: &str) -> ClientResult<bool>
    where
        T: Record + Serialize + DeserializeOwned;
}

/// [`RecordStore`] backed by one JSON file per collection.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document holding `collection`.
    pub fn path_of(&self, collection: CollectionKind) -> PathBuf {
        self.dir.join(format!("{}.json", collection.as_str()))
    }

    fn read<T: DeserializeOwned>(&self, collection: CollectionKind) -> ClientResult<Vec<T>> {
        let path = self.path_of(collection);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ClientError::Store(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            warn!(path = %path.display(), error = %e, "collection document is corrupt");
            ClientError::Store(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    fn write<T: Serialize>(&self, collection: CollectionKind, records: &[T]) -> ClientResult<()> {
        let path = self.path_of(collection);
        let store_err =
            |e: io::Error| ClientError::Store(format!("failed to write {}: {}", path.display(), e));

        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| ClientError::Store(format!("failed to serialize {collection}: {e}")))?;
        write_atomic(&path, &json, false).map_err(store_err)?;

        debug!(collection = %collection, count = records.len(), "collection saved");
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn list<T>(&self, collection: CollectionKind) -> ClientResult<Vec<T>>
    where
        T: Record + DeserializeOwned,
    {
        self.read(collection)
    }

    fn add<T>(&self, collection: CollectionKind, record: T) -> ClientResult<()>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let mut records: Vec<T> = self.read(collection)?;
        records.push(record);
        self.write(collection, &records)
    }

    fn update<T>(&self, collection: CollectionKind, record: T) -> ClientResult<bool>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let mut records: Vec<T> = self.read(collection)?;
        let Some(slot) = records.iter_mut().find(|r| r.id() == record.id()) else {
            return Ok(false);
        };
        *slot = record;
        self.write(collection, &records)?;
        Ok(true)
    }

    fn delete<T>(&self, collection: CollectionKind, id: &str) -> ClientResult<bool>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let mut records: Vec<T> = self.read(collection)?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write(collection, &records)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use dayboard_core::{ChecklistItem, QuickLink};

    use super::*;

    #[test]
    fn missing_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let items: Vec<ChecklistItem> = store.list(CollectionKind::Tasks).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn add_update_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("board"));

        let item = ChecklistItem::new("write report").unwrap();
        store.add(CollectionKind::Tasks, item.clone()).unwrap();

        let mut done = item.clone();
        done.toggle();
        assert!(store.update(CollectionKind::Tasks, done).unwrap());

        let items: Vec<ChecklistItem> = store.list(CollectionKind::Tasks).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].completed);

        assert!(store.delete::<ChecklistItem>(CollectionKind::Tasks, &item.id).unwrap());
        assert!(!store.delete::<ChecklistItem>(CollectionKind::Tasks, &item.id).unwrap());
        let items: Vec<ChecklistItem> = store.list(CollectionKind::Tasks).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn update_of_unknown_id_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let item = ChecklistItem::new("ghost").unwrap();
        assert!(!store.update(CollectionKind::Tasks, item).unwrap());
        assert!(!store.path_of(CollectionKind::Tasks).exists());
    }

    #[test]
    fn collections_are_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store
            .add(CollectionKind::WeeklyGoals, ChecklistItem::new("ship v1").unwrap())
            .unwrap();
        store
            .add(CollectionKind::QuickAccess, QuickLink::new("Docs", "docs.rs").unwrap())
            .unwrap();

        assert!(dir.path().join("weeklyGoals.json").exists());
        assert!(dir.path().join("quickAccess.json").exists());
        let tasks: Vec<ChecklistItem> = store.list(CollectionKind::Tasks).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.path_of(CollectionKind::Tasks), "{not json").unwrap();
        let err = store.list::<ChecklistItem>(CollectionKind::Tasks).unwrap_err();
        assert!(matches!(err, ClientError::Store(_)));
    }
}
