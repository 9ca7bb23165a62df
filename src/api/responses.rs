//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{GateAction, TimerSnapshot},
    state::{Phase, ScheduleDraft},
};

/// Timer view in the field names clients already expect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerStateResponse {
    #[serde(rename = "isTimerRunning")]
    pub is_timer_running: bool,
    #[serde(rename = "isPaused")]
    pub is_paused: bool,
    #[serde(rename = "elapsedTime")]
    pub elapsed_time: u64,
    #[serde(rename = "currentTime")]
    pub current_time: String,
    pub phase: Phase,
}

impl From<TimerSnapshot> for TimerStateResponse {
    fn from(snapshot: TimerSnapshot) -> Self {
        Self {
            is_timer_running: snapshot.is_running,
            is_paused: snapshot.is_paused,
            elapsed_time: snapshot.elapsed_millis,
            current_time: snapshot.current_time,
            phase: snapshot.phase,
        }
    }
}

/// API response structure for timer commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerStateResponse,
}

impl ApiResponse {
    /// Create a response whose status reflects the timer
    pub fn new(message: String, timer: TimerSnapshot) -> Self {
        let status = if timer.is_running {
            "running"
        } else if timer.is_paused {
            "paused"
        } else {
            "stopped"
        };

        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer: timer.into(),
        }
    }
}

/// Result of reading or saving the schedule
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub schedule: ScheduleDraft,
    #[serde(rename = "inSchedule")]
    pub in_schedule: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<GateAction>,
}

impl ScheduleResponse {
    pub fn ok(schedule: ScheduleDraft, in_schedule: Option<bool>, action: Option<GateAction>) -> Self {
        Self {
            success: true,
            error: None,
            schedule,
            in_schedule,
            action,
        }
    }

    pub fn failed(error: String, schedule: ScheduleDraft, in_schedule: Option<bool>) -> Self {
        Self {
            success: false,
            error: Some(error),
            schedule,
            in_schedule,
            action: None,
        }
    }
}

/// Daemon status with timer, schedule and badge
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerStateResponse,
    pub schedule: ScheduleDraft,
    #[serde(rename = "inSchedule")]
    pub in_schedule: Option<bool>,
    pub badge: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
