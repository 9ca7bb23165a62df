//! In-process store, used by tests and `--ephemeral` runs

use std::{collections::HashMap, sync::Mutex};

use serde_json::Value;

use super::{KeyValueStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set_many(&self, updates: Vec<(&str, Value)>) -> Result<(), StoreError> {
        let mut entries = self.entries.lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        for (key, value) in updates {
            entries.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
