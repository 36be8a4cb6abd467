//! Durable key-value storage
//!
//! The overlay only needs string get/set on a handful of keys. Front ends
//! provide the real backing (`localStorage` in the browser, a JSON file in the
//! terminal build); `MemoryStore` covers tests.

use std::collections::HashMap;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backing storage is not reachable (no window, blocked, missing dir)
    Unavailable(String),
    /// Reading a key failed
    Read(String),
    /// Writing a key failed
    Write(String),
    /// Value could not be serialized
    Serialize(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "Storage unavailable: {}", e),
            Self::Read(e) => write!(f, "Storage read error: {}", e),
            Self::Write(e) => write!(f, "Storage write error: {}", e),
            Self::Serialize(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// A client-side durable key-value store
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite the value stored under `key`
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key` if present
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// In-memory store for tests and for builds without durable storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with a single key
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    /// Make every subsequent write fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::Write("memory store is read-only".into()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::Write("memory store is read-only".into()));
        }
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store_write_failure() {
        let mut store = MemoryStore::with_entry("k", "old");
        store.set_fail_writes(true);

        assert!(matches!(store.set("k", "new"), Err(StoreError::Write(_))));
        assert_eq!(store.raw("k"), Some("old"));
    }
}
