//! Schedule gate: keeps the timer running only inside the daily window

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use super::controller::TimerController;
use crate::{
    state::{format_time_of_day, ScheduleDraft, ScheduleError, ScheduleWindow},
    store::{keys, KeyValueStore},
    utils::{truncate_to_minute, Clock},
};

/// What an evaluation did to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GateAction {
    /// No complete window is configured
    Disabled,
    Started,
    Paused,
    /// Timer already matched the schedule
    Unchanged,
}

pub struct ScheduleGate {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ScheduleGate {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The stored fields, complete or not
    pub fn draft(&self) -> ScheduleDraft {
        ScheduleDraft::load(self.store.as_ref())
    }

    pub fn window(&self) -> Option<ScheduleWindow> {
        ScheduleWindow::load(self.store.as_ref())
    }

    /// `None` when gating is disabled
    pub fn in_schedule(&self) -> Option<bool> {
        let now = truncate_to_minute(self.clock.time_of_day());
        self.window().map(|window| window.contains(now))
    }

    /// Start or pause the timer so that it matches the window
    pub fn evaluate(&self, timer: &TimerController) -> GateAction {
        let Some(window) = self.window() else {
            debug!("No schedule configured, gate disabled");
            return GateAction::Disabled;
        };

        let now = truncate_to_minute(self.clock.time_of_day());
        let inside = window.contains(now);
        let running = timer.is_running();
        debug!(
            "Checking schedule: now={} window={}-{} inside={} running={}",
            format_time_of_day(now),
            format_time_of_day(window.start),
            format_time_of_day(window.end),
            inside,
            running
        );

        match (inside, running) {
            (true, false) => {
                info!("Starting timer based on schedule");
                timer.start();
                GateAction::Started
            }
            (false, true) => {
                info!("Pausing timer based on schedule");
                timer.pause();
                GateAction::Paused
            }
            _ => GateAction::Unchanged,
        }
    }

    /// Validate and store the window, then evaluate it right away.
    ///
    /// A side left blank is removed from the store, which keeps gating off
    /// until both sides are supplied.
    pub fn update_schedule(
        &self,
        draft: &ScheduleDraft,
        timer: &TimerController,
    ) -> Result<GateAction, ScheduleError> {
        let draft = draft.normalized()?;

        let mut updates = Vec::new();
        let mut removals = Vec::new();
        for (key, value) in [
            (keys::SCHEDULE_START, &draft.start_time),
            (keys::SCHEDULE_END, &draft.end_time),
        ] {
            match value {
                Some(time) => updates.push((key, json!(time))),
                None => removals.push(key),
            }
        }
        if !updates.is_empty() {
            self.store.set_many(updates)?;
        }
        if !removals.is_empty() {
            self.store.remove_many(&removals)?;
        }

        info!(
            "Schedule saved: {} - {}",
            draft.start_time.as_deref().unwrap_or("unset"),
            draft.end_time.as_deref().unwrap_or("unset")
        );
        Ok(self.evaluate(timer))
    }

    /// Remove the window, disabling the gate
    pub fn clear_schedule(&self) -> Result<(), ScheduleError> {
        self.store
            .remove_many(&[keys::SCHEDULE_START, keys::SCHEDULE_END])?;
        info!("Schedule cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::TimerEvent,
        services::LogNotifier,
        state::{Durations, TimerRecord},
        store::MemoryStore,
        utils::ManualClock,
    };

    struct Fixture {
        clock: Arc<ManualClock>,
        store: Arc<MemoryStore>,
        controller: TimerController,
        gate: ScheduleGate,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::new(1_700_000_000_000));
            let store = Arc::new(MemoryStore::new());
            let controller = TimerController::new(
                store.clone(),
                clock.clone(),
                Arc::new(LogNotifier::new()),
                Durations::default(),
            );
            let gate = ScheduleGate::new(store.clone(), clock.clone());
            Self {
                clock,
                store,
                controller,
                gate,
            }
        }

        fn save(&self, start: &str, end: &str) -> GateAction {
            let draft = ScheduleDraft {
                start_time: Some(start.to_string()),
                end_time: Some(end.to_string()),
            };
            self.gate.update_schedule(&draft, &self.controller).unwrap()
        }
    }

    #[test]
    fn no_window_never_acts() {
        let f = Fixture::new();
        f.controller.start();
        f.clock.set_time_of_day(3, 0);

        assert_eq!(f.gate.evaluate(&f.controller), GateAction::Disabled);
        assert!(f.controller.is_running());
        assert_eq!(f.gate.in_schedule(), None);
    }

    #[test]
    fn pauses_outside_daytime_window() {
        let f = Fixture::new();
        f.controller.start();
        f.clock.set_time_of_day(20, 0);

        assert_eq!(f.save("09:00", "17:00"), GateAction::Paused);
        assert!(!f.controller.is_running());
    }

    #[test]
    fn starts_inside_daytime_window() {
        let f = Fixture::new();
        f.clock.set_time_of_day(10, 0);

        assert_eq!(f.save("09:00", "17:00"), GateAction::Started);
        assert!(f.controller.is_running());
        assert_eq!(f.gate.in_schedule(), Some(true));
    }

    #[test]
    fn end_minute_keeps_timer_running() {
        let f = Fixture::new();
        f.clock.set_time_of_day(16, 59);
        assert_eq!(f.save("09:00", "17:00"), GateAction::Started);

        f.clock.set_time_of_day(17, 0);
        assert_eq!(f.gate.evaluate(&f.controller), GateAction::Unchanged);
        assert!(f.controller.is_running());

        f.clock.set_time_of_day(17, 1);
        assert_eq!(f.gate.evaluate(&f.controller), GateAction::Paused);
    }

    #[test]
    fn repeated_evaluation_is_quiet() {
        let f = Fixture::new();
        f.clock.set_time_of_day(10, 0);
        f.save("09:00", "17:00");

        let mut events = f.controller.subscribe();
        assert_eq!(f.gate.evaluate(&f.controller), GateAction::Unchanged);
        assert_eq!(f.gate.evaluate(&f.controller), GateAction::Unchanged);
        assert!(events.try_recv().is_err());

        f.clock.set_time_of_day(18, 0);
        assert_eq!(f.gate.evaluate(&f.controller), GateAction::Paused);
        assert_eq!(f.gate.evaluate(&f.controller), GateAction::Unchanged);
        assert_eq!(
            events.try_recv().unwrap(),
            TimerEvent::state_changed(false, true)
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn overnight_window() {
        let f = Fixture::new();
        f.clock.set_time_of_day(23, 30);
        assert_eq!(f.save("22:00", "06:00"), GateAction::Started);
        assert_eq!(f.gate.in_schedule(), Some(true));

        f.clock.set_time_of_day(12, 0);
        assert_eq!(f.gate.in_schedule(), Some(false));
        assert_eq!(f.gate.evaluate(&f.controller), GateAction::Paused);
    }

    #[test]
    fn malformed_input_is_rejected_and_not_stored() {
        let f = Fixture::new();
        let draft = ScheduleDraft {
            start_time: Some("nine".to_string()),
            end_time: Some("17:00".to_string()),
        };

        let result = f.gate.update_schedule(&draft, &f.controller);
        assert!(matches!(result, Err(ScheduleError::InvalidTime(_))));
        assert_eq!(f.gate.draft(), ScheduleDraft::default());
    }

    #[test]
    fn partial_input_disables_gating() {
        let f = Fixture::new();
        f.clock.set_time_of_day(10, 0);
        f.save("09:00", "17:00");

        let draft = ScheduleDraft {
            start_time: Some("08:00".to_string()),
            end_time: None,
        };
        assert_eq!(
            f.gate.update_schedule(&draft, &f.controller).unwrap(),
            GateAction::Disabled
        );
        assert_eq!(f.gate.draft().start_time.as_deref(), Some("08:00"));
        assert_eq!(f.gate.draft().end_time, None);
        assert_eq!(f.gate.window(), None);
    }

    #[test]
    fn schedule_keys_do_not_clobber_timer_start() {
        let f = Fixture::new();
        f.clock.set_time_of_day(10, 0);
        f.controller.start();
        let before = TimerRecord::load(f.store.as_ref()).start_timestamp;

        f.save("09:00", "17:00");
        let after = TimerRecord::load(f.store.as_ref()).start_timestamp;
        assert!(before.is_some());
        assert_eq!(before, after);
    }

    #[test]
    fn clearing_disables_gate() {
        let f = Fixture::new();
        f.clock.set_time_of_day(10, 0);
        f.save("09:00", "17:00");

        f.gate.clear_schedule().unwrap();
        f.clock.set_time_of_day(20, 0);
        assert_eq!(f.gate.evaluate(&f.controller), GateAction::Disabled);
        assert!(f.controller.is_running());
    }
}
