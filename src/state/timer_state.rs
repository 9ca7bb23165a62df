//! Timer state structure and its persisted form

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::store::{self, keys, KeyValueStore, StoreError};

/// Length of the work interval
pub const WORK_DURATION_MS: u64 = 20 * 60 * 1000;
/// Length of the break
pub const BREAK_DURATION_MS: u64 = 20 * 1000;

/// Which sub-timer is counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Working,
    OnBreak,
}

/// Interval lengths for the two phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    pub work_ms: u64,
    pub break_ms: u64,
}

impl Durations {
    pub fn new(work_ms: u64, break_ms: u64) -> Self {
        Self { work_ms, break_ms }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self::new(WORK_DURATION_MS, BREAK_DURATION_MS)
    }
}

/// Durable timer state.
///
/// While running, `start_timestamp` is the epoch instant the work interval
/// began and `elapsed_millis` is zero. While stopped, `start_timestamp` is
/// `None` and `elapsed_millis` holds the progress made so far. During a break
/// `break_started` records when the break began.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerRecord {
    pub is_running: bool,
    pub start_timestamp: Option<i64>,
    pub elapsed_millis: u64,
    pub phase: Phase,
    pub break_started: Option<i64>,
}

impl TimerRecord {
    /// Read the record, substituting defaults for absent fields
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let phase = store
            .get(keys::TIMER_PHASE)
            .ok()
            .flatten()
            .filter(|v| !v.is_null())
            .and_then(|v| match serde_json::from_value::<Phase>(v.clone()) {
                Ok(phase) => Some(phase),
                Err(_) => {
                    warn!("Ignoring unknown timer phase: {}", v);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            is_running: store::read_bool(store, keys::TIMER_RUNNING).unwrap_or(false),
            start_timestamp: store::read_i64(store, keys::TIMER_START),
            elapsed_millis: store::read_u64(store, keys::TIMER_ELAPSED).unwrap_or(0),
            phase,
            break_started: store::read_i64(store, keys::TIMER_BREAK_START),
        }
    }

    /// Write every field in one batch
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.set_many(vec![
            (keys::TIMER_RUNNING, json!(self.is_running)),
            (keys::TIMER_START, opt_json(self.start_timestamp)),
            (keys::TIMER_ELAPSED, json!(self.elapsed_millis)),
            (keys::TIMER_PHASE, json!(self.phase)),
            (keys::TIMER_BREAK_START, opt_json(self.break_started)),
        ])
    }

    /// Whether any timer field has ever been written
    pub fn exists(store: &dyn KeyValueStore) -> bool {
        [keys::TIMER_RUNNING, keys::TIMER_START, keys::TIMER_ELAPSED]
            .iter()
            .any(|key| store.contains(key).unwrap_or(false))
    }
}

fn opt_json(value: Option<i64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

/// Render a duration as zero-padded `MM:SS`
pub fn format_time(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn formats_full_intervals() {
        assert_eq!(format_time(WORK_DURATION_MS), "20:00");
        assert_eq!(format_time(BREAK_DURATION_MS), "00:20");
        assert_eq!(format_time(0), "00:00");
    }

    #[test]
    fn formatting_floors_partial_seconds() {
        assert_eq!(format_time(1_199_500), "19:59");
        assert_eq!(format_time(999), "00:00");
        assert_eq!(format_time(61_000), "01:01");
    }

    #[test]
    fn formatting_matches_minute_second_split() {
        for elapsed in (0..WORK_DURATION_MS).step_by(7_919) {
            let remaining = WORK_DURATION_MS - elapsed;
            let expected = format!(
                "{:02}:{:02}",
                remaining / 60_000,
                (remaining % 60_000) / 1000
            );
            assert_eq!(format_time(remaining), expected);
        }
    }

    #[test]
    fn missing_fields_load_as_defaults() {
        let store = MemoryStore::new();
        assert_eq!(TimerRecord::load(&store), TimerRecord::default());
        assert!(!TimerRecord::exists(&store));
    }

    #[test]
    fn saved_record_loads_back() {
        let store = MemoryStore::new();
        let record = TimerRecord {
            is_running: true,
            start_timestamp: None,
            elapsed_millis: 0,
            phase: Phase::OnBreak,
            break_started: Some(42),
        };
        record.save(&store).unwrap();

        assert_eq!(TimerRecord::load(&store), record);
        assert!(TimerRecord::exists(&store));
    }

    #[test]
    fn unknown_phase_falls_back_to_working() {
        let store = MemoryStore::new();
        store.set(keys::TIMER_PHASE, json!("napping")).unwrap();
        assert_eq!(TimerRecord::load(&store).phase, Phase::Working);
    }
}
