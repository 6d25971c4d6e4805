//! Checklist and quick-access operations over a [`RecordStore`].

use dayboard_core::{ChecklistItem, CollectionKind, QuickLink, Record, sort_newest_first};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::store::RecordStore;

/// The dashboard's collections.
#[derive(Debug, Clone)]
pub struct Board<S> {
    store: S,
}

impl<S: RecordStore> Board<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Items of a checklist collection, newest first.
    pub fn items(&self, kind: CollectionKind) -> ClientResult<Vec<ChecklistItem>> {
        ensure_checklist(kind)?;
        self.sorted(kind)
    }

    /// Adds an item. Blank text adds nothing and returns `None`.
    pub fn add_item(&self, kind: CollectionKind, text: &str) -> ClientResult<Option<ChecklistItem>> {
        ensure_checklist(kind)?;
        let Some(item) = ChecklistItem::new(text) else {
            debug!(collection = %kind, "ignoring blank item");
            return Ok(None);
        };
        self.store.add(kind, item.clone())?;
        Ok(Some(item))
    }

    /// Flips completion of the item whose id starts with `id`.
    pub fn toggle_item(&self, kind: CollectionKind, id: &str) -> ClientResult<ChecklistItem> {
        ensure_checklist(kind)?;
        let mut item: ChecklistItem = self.find(kind, id)?;
        item.toggle();
        if !self.store.update(kind, item.clone())? {
            return Err(not_found(kind, id));
        }
        Ok(item)
    }

    /// Deletes the item whose id starts with `id`.
    pub fn delete_item(&self, kind: CollectionKind, id: &str) -> ClientResult<ChecklistItem> {
        ensure_checklist(kind)?;
        self.remove(kind, id)
    }

    /// Quick-access links, newest first.
    pub fn links(&self) -> ClientResult<Vec<QuickLink>> {
        self.sorted(CollectionKind::QuickAccess)
    }

    /// Adds a link. A blank name, or a url without a host, adds nothing and
    /// returns `None`.
    pub fn add_link(&self, name: &str, url: &str) -> ClientResult<Option<QuickLink>> {
        let Some(link) = QuickLink::new(name, url) else {
            debug!("ignoring link with blank name or unusable url");
            return Ok(None);
        };
        self.store.add(CollectionKind::QuickAccess, link.clone())?;
        Ok(Some(link))
    }

    pub fn delete_link(&self, id: &str) -> ClientResult<QuickLink> {
        self.remove(CollectionKind::QuickAccess, id)
    }

    fn sorted<T: Record + DeserializeOwned>(&self, kind: CollectionKind) -> ClientResult<Vec<T>> {
        let mut records: Vec<T> = self.store.list(kind)?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn remove<T>(&self, kind: CollectionKind, id: &str) -> ClientResult<T>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let record: T = self.find(kind, id)?;
        if !self.store.delete::<T>(kind, record.id())? {
            return Err(not_found(kind, id));
        }
        Ok(record)
    }

    /// Resolves a full id or a unique id prefix.
    fn find<T: Record + DeserializeOwned>(&self, kind: CollectionKind, id: &str) -> ClientResult<T> {
        let id = id.trim();
        if id.is_empty() {
            return Err(not_found(kind, id));
        }
        let mut matches: Vec<T> = self
            .store
            .list::<T>(kind)?
            .into_iter()
            .filter(|r| r.id().starts_with(id))
            .collect();
        if let Some(pos) = matches.iter().position(|r| r.id() == id) {
            return Ok(matches.swap_remove(pos));
        }
        match matches.len() {
            0 => Err(not_found(kind, id)),
            1 => Ok(matches.remove(0)),
            n => Err(ClientError::Input(format!(
                "id '{id}' matches {n} entries in {}",
                kind.title()
            ))),
        }
    }
}

fn ensure_checklist(kind: CollectionKind) -> ClientResult<()> {
    if kind.is_checklist() {
        Ok(())
    } else {
        Err(ClientError::Input(format!("{} is not a checklist", kind.title())))
    }
}

fn not_found(kind: CollectionKind, id: &str) -> ClientError {
    ClientError::Input(format!("no entry '{id}' in {}", kind.title()))
}
