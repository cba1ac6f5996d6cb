//! Generic JSON collection repository
//!
//! Each collection is held in memory as a map keyed by id and persisted as a
//! single pretty-printed JSON document `{ "<collection>": [...] }`. Mutations
//! replace whole entries; nothing is patched in place.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::store::KeyValueStore;
use crate::error::SplitError;

/// An entity stored in a [`Repository`]
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync {
    type Id: Copy + Eq + Hash + Display + Send + Sync;
    type SortKey: Ord;

    /// Store key of the collection document
    const KEY: &'static str;
    /// Field holding the array inside the document
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// Ordering used by `get_all` and on disk
    fn sort_key(&self) -> Self::SortKey;
}

/// In-memory collection backed by a key-value store
pub struct Repository<T: Record> {
    store: Arc<dyn KeyValueStore>,
    data: RwLock<HashMap<T::Id, T>>,
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<T::Id, T>>, SplitError> {
        self.data
            .read()
            .map_err(|e| SplitError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<T::Id, T>>, SplitError> {
        self.data
            .write()
            .map_err(|e| SplitError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load the collection from the store, replacing what is in memory
    pub fn load(&self) -> Result<(), SplitError> {
        let items = match self.store.load(T::KEY)? {
            Some(bytes) => decode::<T>(&bytes)?,
            None => Vec::new(),
        };

        let mut data = self.write()?;
        *data = items.into_iter().map(|item| (item.id(), item)).collect();
        Ok(())
    }

    /// Save the collection to the store
    pub fn save(&self) -> Result<(), SplitError> {
        let items = self.get_all()?;

        let mut document = Map::new();
        document.insert(
            T::COLLECTION.to_string(),
            serde_json::to_value(&items).map_err(|e| {
                SplitError::Storage(format!("Failed to serialize {}: {}", T::COLLECTION, e))
            })?,
        );
        let bytes = serde_json::to_vec_pretty(&Value::Object(document))?;

        self.store.save(T::KEY, &bytes)
    }

    /// Drop everything held in memory
    pub fn clear(&self) -> Result<(), SplitError> {
        self.write()?.clear();
        Ok(())
    }

    pub fn get(&self, id: T::Id) -> Result<Option<T>, SplitError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All entries in sort-key order
    pub fn get_all(&self) -> Result<Vec<T>, SplitError> {
        let mut items: Vec<T> = self.read()?.values().cloned().collect();
        items.sort_by_key(|item| item.sort_key());
        Ok(items)
    }

    /// Entries matching a predicate, in sort-key order
    pub fn find_all(&self, predicate: impl Fn(&T) -> bool) -> Result<Vec<T>, SplitError> {
        Ok(self.get_all()?.into_iter().filter(|item| predicate(item)).collect())
    }

    /// Insert or replace an entry
    pub fn upsert(&self, item: T) -> Result<(), SplitError> {
        self.write()?.insert(item.id(), item);
        Ok(())
    }

    /// Remove an entry, returning whether it existed
    pub fn delete(&self, id: T::Id) -> Result<bool, SplitError> {
        Ok(self.write()?.remove(&id).is_some())
    }

    pub fn exists(&self, id: T::Id) -> Result<bool, SplitError> {
        Ok(self.read()?.contains_key(&id))
    }

    pub fn count(&self) -> Result<usize, SplitError> {
        Ok(self.read()?.len())
    }
}

fn decode<T: Record>(bytes: &[u8]) -> Result<Vec<T>, SplitError> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| SplitError::Storage(format!("Failed to parse {}: {}", T::KEY, e)))?;

    match document.get(T::COLLECTION) {
        Some(items) => serde_json::from_value(items.clone())
            .map_err(|e| SplitError::Storage(format!("Failed to parse {}: {}", T::KEY, e))),
        None => Ok(Vec::new()),
    }
}
