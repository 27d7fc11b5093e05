//! Typed JSON tables over a [`StorageBackend`].
//!
//! Each key holds one whole collection as a JSON array. Reads never fail:
//! an absent key, a backend error or unparsable content all read as an
//! empty collection (logged). Writes replace the entire collection.

use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::warn;

use super::StorageBackend;
use crate::shared::errors::InfraError;

/// Outcome of a [`PersistentStore::modify`] closure.
#[derive(Debug)]
pub enum Commit<R> {
    /// Persist the modified collection and return `R`.
    Write(R),
    /// Leave storage untouched and return `R`.
    Skip(R),
}

pub struct PersistentStore {
    backend: Arc<dyn StorageBackend>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            locks: DashMap::new(),
        }
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read collection, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(key, error = %e, "Corrupt collection data, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn write<T: Serialize>(&self, key: &str, records: &[T]) -> Result<(), InfraError> {
        let raw = serde_json::to_string(records)?;
        self.backend.set_item(key, &raw)
    }

    /// Read-modify-write of one collection.
    ///
    /// Calls on the same key from this process are serialized. Writers in
    /// other processes are not coordinated: the last write wins.
    pub async fn modify<T, R, E, F>(&self, key: &str, f: F) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<Commit<R>, E>,
        E: From<InfraError>,
    {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let mut records = self.read::<T>(key);
        match f(&mut records)? {
            Commit::Write(result) => {
                self.write(key, &records)?;
                Ok(result)
            }
            Commit::Skip(result) => Ok(result),
        }
    }

    /// Single JSON object stored under `key`, e.g. the signed-in user.
    pub fn read_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_item(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "Failed to read value");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Corrupt value, ignoring");
                None
            }
        }
    }

    pub fn write_value<T: Serialize>(&self, key: &str, value: &T) -> Result<(), InfraError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set_item(key, &raw)
    }

    pub fn remove(&self, key: &str) -> Result<(), InfraError> {
        self.backend.remove_item(key)
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let entry = self.locks.entry(key.to_string()).or_default();
        Arc::clone(&*entry)
    }
}
