//! # Persistence Module
//!
//! Key-value storage for everything the overlay keeps between runs: the learned
//! calibration document and the chroma-key background colour.
//!
//! ## Key Abstractions
//! - [`KeyValueStore`]: string keys to string values, nothing more. The mapping layer
//!   owns the JSON encoding of the values, the store only moves strings around.
//! - [`FileStore`]: a single TOML file under the user's config directory.
//! - [`MemoryStore`]: an in-process map, used by tests and as a fallback when the
//!   storage file cannot be opened.
//!
//! ## Error Handling Strategy
//! Reads never fail: a missing or unreadable entry is simply absent. Writes report a
//! [`StoreError`] so callers can log and carry on with the in-memory state.

pub mod file_store;

use std::collections::BTreeMap;
use thiserror::Error;

pub use file_store::FileStore;

/// Storage key of the serialized calibration mapping
pub const CALIBRATION_KEY: &str = "calibration";

/// Storage key of the overlay background colour (`#RRGGBB`)
pub const BACKGROUND_COLOR_KEY: &str = "backgroundColor";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read storage file: {0}")]
    ReadError(String),

    #[error("Failed to write storage file: {0}")]
    WriteError(String),

    #[error("Failed to serialize storage: {0}")]
    SerializationError(String),
}

/// Minimal string key-value storage used by the mapping store.
pub trait KeyValueStore {
    /// Returns the stored value, `None` if the key is absent
    fn get(&self, key: &str) -> Option<String>;

    /// Stores the value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the key; removing an absent key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Volatile store backed by a map.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        assert!(store.get(CALIBRATION_KEY).is_none());

        store.set(CALIBRATION_KEY, "{}").unwrap();
        assert_eq!(store.get(CALIBRATION_KEY).as_deref(), Some("{}"));

        store.set(CALIBRATION_KEY, "{\"vb1\":1}").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(CALIBRATION_KEY).as_deref(), Some("{\"vb1\":1}"));

        store.remove(CALIBRATION_KEY).unwrap();
        store.remove(BACKGROUND_COLOR_KEY).unwrap();
        assert!(store.is_empty());
    }
}
