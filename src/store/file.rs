//! JSON file backed store

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{KeyValueStore, StoreError};

/// Keeps the whole map in memory and rewrites the file on every write.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories if needed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries = if path.exists() {
            let data = fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&data)? {
                    Value::Object(map) => map,
                    _ => return Err(StoreError::NotAnObject(path.display().to_string())),
                }
            }
        } else {
            Map::new()
        };

        info!("Opened state store at {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocking write, made while the caller holds the engine lock. The file
    /// is a handful of keys and only changes on timer and schedule transitions.
    fn flush(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Flushed {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
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
        self.flush(&entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() != before {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::keys;
    use serde_json::json;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = JsonFileStore::open(&path).unwrap();
        store
            .set_many(vec![
                (keys::TIMER_ELAPSED, json!(5000)),
                (keys::SCHEDULE_START, json!("09:00")),
            ])
            .unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get(keys::TIMER_ELAPSED).unwrap(), Some(json!(5000)));
        assert_eq!(reopened.get(keys::SCHEDULE_START).unwrap(), Some(json!("09:00")));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn remove_drops_keys_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set(keys::SCHEDULE_END, json!("17:00")).unwrap();
        store.remove_many(&[keys::SCHEDULE_END]).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get(keys::SCHEDULE_END).unwrap(), None);
    }

    #[test]
    fn rejects_non_object_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::NotAnObject(_))
        ));
    }

    #[test]
    fn empty_file_opens_as_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get(keys::TIMER_RUNNING).unwrap(), None);
        assert_eq!(store.path(), path.as_path());
    }
}
