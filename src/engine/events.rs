//! Events broadcast to connected clients

use serde::Serialize;

use crate::services::Notice;

/// Wire shape mirrors the message names clients already listen for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    /// New countdown text
    UpdateTimer { time: String },
    /// Running/paused flags changed
    TimerStateChanged {
        #[serde(rename = "isRunning")]
        is_running: bool,
        #[serde(rename = "isPaused")]
        is_paused: bool,
    },
    /// A break alert fired
    Notification {
        id: &'static str,
        title: &'static str,
        message: &'static str,
    },
}

impl TimerEvent {
    pub fn update(time: impl Into<String>) -> Self {
        TimerEvent::UpdateTimer { time: time.into() }
    }

    pub fn state_changed(is_running: bool, is_paused: bool) -> Self {
        TimerEvent::TimerStateChanged {
            is_running,
            is_paused,
        }
    }

    pub fn notification(notice: Notice) -> Self {
        TimerEvent::Notification {
            id: notice.id(),
            title: notice.title(),
            message: notice.message(),
        }
    }

    /// Event name used on the SSE stream
    pub fn kind(&self) -> &'static str {
        match self {
            TimerEvent::UpdateTimer { .. } => "updateTimer",
            TimerEvent::TimerStateChanged { .. } => "timerStateChanged",
            TimerEvent::Notification { .. } => "notification",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_message_type_tag() {
        let value = serde_json::to_value(TimerEvent::state_changed(true, false)).unwrap();
        assert_eq!(
            value,
            json!({"type": "timerStateChanged", "isRunning": true, "isPaused": false})
        );

        let value = serde_json::to_value(TimerEvent::update("19:59")).unwrap();
        assert_eq!(value, json!({"type": "updateTimer", "time": "19:59"}));
    }

    #[test]
    fn kind_matches_tag() {
        for event in [
            TimerEvent::update("00:00"),
            TimerEvent::state_changed(false, true),
            TimerEvent::notification(Notice::BreakStart),
        ] {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], event.kind());
        }
    }
}
