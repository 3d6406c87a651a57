//! Storage Backend Module
//!
//! Boundary for the durable, synchronous, local byte-string store backing the
//! persistent cache. The host environment supplies the real store; this module
//! defines the contract and an in-memory implementation for tests and hosts
//! without native storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

// == Storage Backend Trait ==
/// Synchronous key-value byte-string store scoped to the current origin.
///
/// One blob per namespace key. The persistent cache never calls anything
/// beyond these three operations, and it catches every error they return.
pub trait StorageBackend {
    /// Reads the string stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, overwriting any prior value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Removes `key` and its value. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// == Memory Store ==
/// In-memory storage backend.
///
/// Cloned handles share one underlying map, so independent cache instances
/// pointed at the same namespace key observe each other's writes, with the
/// same read-modify-write race a host-provided store has.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}
