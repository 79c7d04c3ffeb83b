//! Durable key-value storage.
//!
//! Stores own whole records: each write replaces everything under its key,
//! and each load reads the whole record back. There is no partial update and
//! no versioning of individual records.

pub mod migrations;
pub mod schema;
mod sqlite;

use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};

pub use sqlite::{SqliteStore, StorageStats};

/// Key holding the registered user.
pub const USER_KEY: &str = "SeniorConnect.currentUser";

/// Key holding the volunteer collection.
pub const VOLUNTEERS_KEY: &str = "SeniorConnect.volunteers";

/// A durable byte store addressed by string keys.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-process store, used by tests and by embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Load and decode the record under `key`.
///
/// A missing record, an unreadable store and an undecodable record all yield
/// `None`; the latter two are logged.
pub(crate) fn load_record<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!("No record stored under {}", key);
            return None;
        }
        Err(e) => {
            error!("Failed to read {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding corrupt record under {}: {}", key, e);
            None
        }
    }
}

/// Encode `value` and overwrite the record under `key`.
///
/// Failures are logged and otherwise ignored; the caller keeps its in-memory
/// state either way.
pub(crate) fn save_record<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to encode record for {}: {}", key, e);
            return;
        }
    };

    match store.set(key, &bytes) {
        Ok(()) => debug!("Wrote {} bytes under {}", bytes.len(), key),
        Err(e) => error!("Failed to write {}: {}", key, e),
    }
}

/// Remove the record under `key`, logging failures.
pub(crate) fn delete_record(store: &dyn KeyValueStore, key: &str) {
    if let Err(e) = store.delete(key) {
        error!("Failed to delete {}: {}", key, e);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A store whose writes always fail, for exercising the skip-on-error path.
    #[derive(Debug, Default)]
    pub struct FailingStore {
        pub inner: MemoryStore,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn set(&self, _key: &str, _value: &[u8]) -> Result<()> {
            Err(Error::internal("disk full"))
        }

        fn delete(&self, _key: &str) -> Result<()> {
            Err(Error::internal("disk full"))
        }
    }
}
