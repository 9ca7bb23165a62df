//! State management module
//!
//! Persisted timer and schedule records plus the shared application state.

pub mod app_state;
pub mod schedule;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use schedule::{format_time_of_day, parse_time_of_day, ScheduleDraft, ScheduleError, ScheduleWindow};
pub use timer_state::{
    format_time, Durations, Phase, TimerRecord, BREAK_DURATION_MS, WORK_DURATION_MS,
};
