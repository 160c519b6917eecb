use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error as ThisError;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum StoreError {
    #[error("key not found")]
    NotFound,
    #[error("store lock poisoned")]
    Poisoned,
}

/// The key space commands operate on.
///
/// Implementations are shared by every connection task, so each operation has to be atomic on its
/// own; callers never lock around them.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    fn set(&self, key: String, value: Bytes) -> Result<(), StoreError>;

    /// Removes `key`, returning whether it was present.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

/// An in-memory map of keys to byte strings. Cloning is cheap, every clone refers to the same map.
#[derive(Clone, Default)]
pub struct Store {
    keys: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl Store {
    pub fn new() -> Store {
        Store::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Bytes>>, StoreError> {
        self.keys.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Storage for Store {
    fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.lock()?.get(key).cloned().ok_or(StoreError::NotFound)
    }

    fn set(&self, key: String, value: Bytes) -> Result<(), StoreError> {
        self.lock()?.insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.remove(key).is_some())
    }
}
