//! Core storage layer
//!
//! Handles the fundamental storage operations including:
//! - The key-value backend seam (in-memory or one file per key)
//! - Per-user key namespacing
//! - Typed load/save of record collections

mod keys;
pub mod persistence;

pub use keys::{EntityKind, StorageKey};
pub use persistence::FileStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::records::StoredRecord;

/// String-keyed, string-valued store shared by every user.
///
/// No delete: removal saves the filtered collection.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// All keys starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Typed view over a [`KeyValueStore`].
///
/// Every save overwrites the whole value for its key. Read-modify-write
/// sequences built on top are not atomic: concurrent writers to one key race
/// and the last save wins.
#[derive(Debug, Clone)]
pub struct EntityStore {
    backend: Arc<dyn KeyValueStore>,
}

impl EntityStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        EntityStore { backend }
    }

    /// Load a user's collection; a missing or malformed value reads as empty.
    pub fn load<T: StoredRecord>(&self, user_id: &str) -> Result<Vec<T>, StoreError> {
        let key = StorageKey::collection(T::KIND, user_id);
        Ok(self.load_document(&key)?.unwrap_or_default())
    }

    /// Like [`load`](Self::load), but a malformed value is an error.
    pub fn try_load<T: StoredRecord>(&self, user_id: &str) -> Result<Vec<T>, StoreError> {
        let key = StorageKey::collection(T::KIND, user_id);
        Ok(self.try_load_document(&key)?.unwrap_or_default())
    }

    pub fn save<T: StoredRecord>(&self, user_id: &str, records: &[T]) -> Result<(), StoreError> {
        let key = StorageKey::collection(T::KIND, user_id);
        self.save_document(&key, records)?;
        debug!(key = %key, count = records.len(), "saved collection");
        Ok(())
    }

    /// Swap in `record` for the stored record with the same id.
    pub fn replace<T: StoredRecord>(&self, user_id: &str, record: T) -> Result<bool, StoreError> {
        let mut records: Vec<T> = self.load(user_id)?;
        let Some(slot) = records.iter_mut().find(|r| r.id() == record.id()) else {
            return Ok(false);
        };
        *slot = record;
        self.save(user_id, &records)?;
        Ok(true)
    }

    /// Drop the record with `id`, keeping the others in order.
    pub fn remove<T: StoredRecord>(&self, user_id: &str, id: &str) -> Result<bool, StoreError> {
        let records: Vec<T> = self.load(user_id)?;
        let before = records.len();
        let remaining: Vec<T> = records.into_iter().filter(|r| r.id() != id).collect();
        if remaining.len() == before {
            return Ok(false);
        }
        self.save(user_id, &remaining)?;
        Ok(true)
    }

    pub fn load_document<T: DeserializeOwned>(
        &self,
        key: &StorageKey,
    ) -> Result<Option<T>, StoreError> {
        match self.try_load_document(key) {
            Err(StoreError::Decode { key, source }) => {
                warn!(key = %key, error = %source, "discarding malformed stored value");
                Ok(None)
            }
            other => other,
        }
    }

    pub fn try_load_document<T: DeserializeOwned>(
        &self,
        key: &StorageKey,
    ) -> Result<Option<T>, StoreError> {
        let Some(text) = self.backend.get(key.as_str())? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            })
    }

    pub fn save_document<T: Serialize + ?Sized>(
        &self,
        key: &StorageKey,
        value: &T,
    ) -> Result<(), StoreError> {
        let text = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key.as_str(), &text)
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.backend.keys_with_prefix(prefix)
    }
}
