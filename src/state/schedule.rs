//! Daily schedule window

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::store::{self, keys, KeyValueStore, StoreError};

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("failed to persist schedule: {0}")]
    Store(#[from] StoreError),
}

/// Parse an `HH:MM` time of day
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ScheduleError::InvalidTime(value.to_string()))
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// A `[start, end]` window of the day, both end minutes included. `end` before
/// `start` means the window runs past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ScheduleWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ScheduleError> {
        Ok(Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?))
    }

    /// Whether `time` falls inside the window, compared at minute granularity
    pub fn contains(&self, time: NaiveTime) -> bool {
        let start = minutes_of_day(self.start);
        let mut end = minutes_of_day(self.end);
        let mut current = minutes_of_day(time);

        if end < start {
            end += MINUTES_PER_DAY;
            if current < start {
                current += MINUTES_PER_DAY;
            }
        }

        start <= current && current <= end
    }

    /// Load the window; `None` unless both ends are stored and valid
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let draft = ScheduleDraft::load(store);
        let (start, end) = (draft.start_time?, draft.end_time?);
        match Self::parse(&start, &end) {
            Ok(window) => Some(window),
            Err(e) => {
                warn!("Ignoring stored schedule: {}", e);
                None
            }
        }
    }
}

fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Raw schedule fields as the user supplied them. Either side may be missing,
/// in which case gating stays off until both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDraft {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl ScheduleDraft {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            start_time: store::read_string(store, keys::SCHEDULE_START),
            end_time: store::read_string(store, keys::SCHEDULE_END),
        }
    }

    /// Trim both sides and drop blanks, rejecting anything that is not `HH:MM`
    pub fn normalized(&self) -> Result<Self, ScheduleError> {
        let clean = |value: &Option<String>| -> Result<Option<String>, ScheduleError> {
            match value.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(raw) => parse_time_of_day(raw).map(|t| Some(format_time_of_day(t))),
            }
        };
        Ok(Self {
            start_time: clean(&self.start_time)?,
            end_time: clean(&self.end_time)?,
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn daytime_window() {
        let window = ScheduleWindow::parse("09:00", "17:00").unwrap();
        assert!(window.contains(at(10, 0)));
        assert!(window.contains(at(9, 0)));
        assert!(window.contains(at(17, 0)));
        assert!(!window.contains(at(17, 1)));
        assert!(!window.contains(at(20, 0)));
        assert!(!window.contains(at(8, 59)));
    }

    #[test]
    fn overnight_window() {
        let window = ScheduleWindow::parse("22:00", "06:00").unwrap();
        assert!(window.contains(at(23, 30)));
        assert!(window.contains(at(0, 0)));
        assert!(window.contains(at(6, 0)));
        assert!(!window.contains(at(6, 1)));
        assert!(!window.contains(at(12, 0)));
        assert!(!window.contains(at(21, 59)));
    }

    #[test]
    fn seconds_are_ignored() {
        let window = ScheduleWindow::parse("09:00", "09:01").unwrap();
        assert!(window.contains(NaiveTime::from_hms_opt(9, 0, 59).unwrap()));
    }

    #[test]
    fn equal_ends_cover_a_single_minute() {
        let window = ScheduleWindow::parse("12:00", "12:00").unwrap();
        assert!(window.contains(at(12, 0)));
        assert!(!window.contains(at(12, 1)));
        assert!(!window.contains(at(11, 59)));
    }

    #[test]
    fn rejects_malformed_times() {
        assert!(matches!(
            ScheduleWindow::parse("9am", "17:00"),
            Err(ScheduleError::InvalidTime(_))
        ));
        assert!(parse_time_of_day("25:00").is_err());
    }

    #[test]
    fn draft_normalizes_and_detects_partial_input() {
        let draft = ScheduleDraft {
            start_time: Some(" 09:00 ".to_string()),
            end_time: Some(String::new()),
        }
        .normalized()
        .unwrap();

        assert_eq!(draft.start_time.as_deref(), Some("09:00"));
        assert_eq!(draft.end_time, None);
    }

    #[test]
    fn draft_deserializes_with_missing_fields() {
        let draft: ScheduleDraft = serde_json::from_str(r#"{"startTime":"22:00"}"#).unwrap();
        assert_eq!(draft.start_time.as_deref(), Some("22:00"));
        assert_eq!(draft.end_time, None);
    }
}
