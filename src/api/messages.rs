//! Message protocol accepted on `POST /message`

use serde::Deserialize;

use crate::state::ScheduleDraft;

/// One command from a client, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    StartTimer,
    PauseTimer,
    ResumeTimer,
    ResetTimer,
    GetTimerState,
    UpdateSchedule {
        #[serde(rename = "startTime", default)]
        start_time: Option<String>,
        #[serde(rename = "endTime", default)]
        end_time: Option<String>,
    },
}

impl Message {
    /// Schedule fields carried by an `updateSchedule` message
    pub fn schedule(&self) -> Option<ScheduleDraft> {
        match self {
            Message::UpdateSchedule {
                start_time,
                end_time,
            } => Some(ScheduleDraft {
                start_time: start_time.clone(),
                end_time: end_time.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_commands() {
        let message: Message = serde_json::from_str(r#"{"type":"resumeTimer"}"#).unwrap();
        assert_eq!(message, Message::ResumeTimer);
        assert_eq!(message.schedule(), None);
    }

    #[test]
    fn parses_schedule_update() {
        let message: Message =
            serde_json::from_str(r#"{"type":"updateSchedule","startTime":"09:00","endTime":"17:00"}"#)
                .unwrap();
        let draft = message.schedule().unwrap();
        assert_eq!(draft.start_time.as_deref(), Some("09:00"));
        assert_eq!(draft.end_time.as_deref(), Some("17:00"));
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(serde_json::from_str::<Message>(r#"{"type":"openPopup"}"#).is_err());
    }
}
