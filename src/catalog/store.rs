// Catalog store - the ordered entry list and its persistence
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{seed_catalog, CatalogEntry};
use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the serialized catalog
pub const CATALOG_KEY: &str = "view_4k_movies";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("an entry with id {0} already exists")]
    DuplicateId(String),

    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to persist catalog: {0}")]
    Storage(#[from] StorageError),
}

/// Handle returned by [`CatalogStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&[CatalogEntry])>;

/// Owns the catalog. Newest entries come first.
///
/// Every change is written through to storage and then announced to
/// subscribers with the full ordered list.
pub struct CatalogStore {
    storage: Box<dyn KeyValueStore>,
    entries: Vec<CatalogEntry>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl CatalogStore {
    /// Create a store over `storage`, loading whatever it holds
    pub fn open(storage: Box<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            storage,
            entries: Vec::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
        };
        store.entries = store.load();
        info!("Catalog loaded with {} entries", store.entries.len());
        store
    }

    /// Read the persisted catalog. Falls back to the seed catalog when nothing
    /// is stored or the stored value cannot be parsed.
    pub fn load(&self) -> Vec<CatalogEntry> {
        read_catalog(self.storage.as_ref())
    }

    /// Current entries in display order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Insert an entry at the front, persist and notify subscribers.
    ///
    /// A failed save still leaves the entry in memory; the error is returned
    /// so the caller can report it.
    pub fn append(&mut self, entry: CatalogEntry) -> Result<(), CatalogError> {
        if self.contains(&entry.id) {
            return Err(CatalogError::DuplicateId(entry.id));
        }

        info!(id = %entry.id, title = %entry.title, "Adding entry to catalog");
        self.entries.insert(0, entry);

        let saved = self.save();
        self.notify();
        saved
    }

    /// Write the full catalog to storage, replacing what was there
    pub fn save(&self) -> Result<(), CatalogError> {
        let json = serde_json::to_string(&self.entries)?;
        self.storage.set(CATALOG_KEY, &json)?;
        debug!("Saved {} catalog entries ({} bytes)", self.entries.len(), json.len());
        Ok(())
    }

    /// Register a callback run after every catalog change
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&[CatalogEntry]) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    #[allow(dead_code)]
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    fn notify(&mut self) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&self.entries);
        }
    }
}

fn read_catalog(storage: &dyn KeyValueStore) -> Vec<CatalogEntry> {
    match storage.get(CATALOG_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<CatalogEntry>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Stored catalog is unreadable, using seed catalog: {}", e);
                seed_catalog()
            }
        },
        Ok(None) => seed_catalog(),
        Err(e) => {
            warn!("Failed to read stored catalog, using seed catalog: {}", e);
            seed_catalog()
        }
    }
}
