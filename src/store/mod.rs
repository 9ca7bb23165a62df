//! Flat key-value persistence
//!
//! Every durable field of the timer and the schedule lives under its own key.
//! Timer keys and schedule keys carry distinct prefixes so the timer's start
//! instant can never be confused with the schedule's start time of day.

pub mod file;
pub mod memory;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Storage keys
pub mod keys {
    pub const TIMER_START: &str = "timer.startTime";
    pub const TIMER_ELAPSED: &str = "timer.elapsedTime";
    pub const TIMER_RUNNING: &str = "timer.isRunning";
    pub const TIMER_PHASE: &str = "timer.phase";
    pub const TIMER_BREAK_START: &str = "timer.breakStartTime";
    pub const SCHEDULE_START: &str = "schedule.startTime";
    pub const SCHEDULE_END: &str = "schedule.endTime";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store file {0} does not hold a JSON object")]
    NotAnObject(String),
    #[error("failed to lock store: {0}")]
    Lock(String),
}

/// A flat map of string keys to JSON values.
///
/// Writes are batched so a single transition persists all of its fields at
/// once. A `Value::Null` entry is kept as an explicit "cleared" marker.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set_many(&self, entries: Vec<(&str, Value)>) -> Result<(), StoreError>;

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.set_many(vec![(key, value)])
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

fn read(store: &dyn KeyValueStore, key: &str) -> Option<Value> {
    match store.get(key) {
        Ok(value) => value.filter(|v| !v.is_null()),
        Err(e) => {
            warn!("Failed to read {} from store: {}", key, e);
            None
        }
    }
}

/// Read an integer, treating absent or mistyped values as missing
pub fn read_i64(store: &dyn KeyValueStore, key: &str) -> Option<i64> {
    let value = read(store, key)?;
    let parsed = value.as_i64();
    if parsed.is_none() {
        warn!("Ignoring non-integer value for {}: {}", key, value);
    }
    parsed
}

pub fn read_u64(store: &dyn KeyValueStore, key: &str) -> Option<u64> {
    let value = read(store, key)?;
    let parsed = value.as_u64();
    if parsed.is_none() {
        warn!("Ignoring non-integer value for {}: {}", key, value);
    }
    parsed
}

pub fn read_bool(store: &dyn KeyValueStore, key: &str) -> Option<bool> {
    let value = read(store, key)?;
    let parsed = value.as_bool();
    if parsed.is_none() {
        warn!("Ignoring non-boolean value for {}: {}", key, value);
    }
    parsed
}

pub fn read_string(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match read(store, key)? {
        Value::String(s) => Some(s),
        other => {
            warn!("Ignoring non-string value for {}: {}", key, other);
            None
        }
    }
}
