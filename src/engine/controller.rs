//! Work/break timer state machine

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info};

use super::events::TimerEvent;
use crate::{
    services::{Notice, Notifier},
    state::{format_time, Durations, Phase, TimerRecord},
    store::KeyValueStore,
    utils::Clock,
};

/// Point-in-time view of the timer for clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub is_running: bool,
    pub is_paused: bool,
    pub elapsed_millis: u64,
    pub current_time: String,
    pub phase: Phase,
}

/// Drives the 20-minute work interval and the 20-second break.
///
/// All state is read from and written back to the store on every call, so a
/// fresh controller over the same store picks up exactly where the previous
/// process stopped. The recurring one-second tick is not run here: the
/// controller only flips an "armed" flag that the ticker task watches, and
/// the ticker calls [`TimerController::tick`].
pub struct TimerController {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    durations: Durations,
    events: broadcast::Sender<TimerEvent>,
    tick_armed: watch::Sender<bool>,
}

impl TimerController {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        durations: Durations,
    ) -> Self {
        let (events, _) = broadcast::channel(100);
        let (tick_armed, _) = watch::channel(false);

        Self {
            store,
            clock,
            notifier,
            durations,
            events,
            tick_armed,
        }
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub fn event_sender(&self) -> broadcast::Sender<TimerEvent> {
        self.events.clone()
    }

    /// Receiver for the tick armed flag; every arm marks it changed
    pub fn tick_armed(&self) -> watch::Receiver<bool> {
        self.tick_armed.subscribe()
    }

    pub fn is_tick_armed(&self) -> bool {
        *self.tick_armed.borrow()
    }

    /// Persisted running flag
    pub fn is_running(&self) -> bool {
        self.load().is_running
    }

    /// First boot: lay down a zeroed record if nothing has been stored yet
    pub fn initialize(&self) {
        if TimerRecord::exists(self.store.as_ref()) {
            debug!("Timer state already present in store");
            return;
        }
        info!("No stored timer state, initializing");
        self.reset();
    }

    /// Re-arm whichever sub-timer was running when the process last stopped
    pub fn restore(&self) {
        let record = self.load();
        if !record.is_running {
            debug!("Timer was not running, nothing to restore");
            return;
        }

        match record.phase {
            Phase::Working => {
                info!("Restoring running work interval");
                self.start();
            }
            Phase::OnBreak => {
                info!("Restoring break in progress");
                self.arm();
                self.tick();
            }
        }
    }

    /// Start the work interval, continuing from any saved progress
    pub fn start(&self) {
        let record = self.load();
        if record.is_running && record.phase == Phase::OnBreak {
            debug!("Start ignored while on break");
            return;
        }

        let now = self.clock.now_millis();
        let start = if record.elapsed_millis > 0 {
            // Saved progress never exceeds one work interval
            let elapsed = record.elapsed_millis.min(self.durations.work_ms);
            now.saturating_sub(elapsed as i64)
        } else {
            record.start_timestamp.unwrap_or(now)
        };

        info!("Starting work timer ({} elapsed)", format_time(millis_between(start, now)));
        self.persist(&TimerRecord {
            is_running: true,
            start_timestamp: Some(start),
            elapsed_millis: 0,
            phase: Phase::Working,
            break_started: None,
        });
        self.arm();
        self.broadcast(TimerEvent::state_changed(true, false));
        self.tick();
    }

    /// Stop the tick and keep the progress made so far
    pub fn pause(&self) {
        let record = self.load();
        self.disarm();

        let elapsed = match record.phase {
            Phase::Working => self.work_elapsed(&record),
            Phase::OnBreak => {
                info!("Pausing during break, break abandoned");
                0
            }
        };

        info!("Pausing timer at {} elapsed", format_time(elapsed));
        self.persist(&TimerRecord {
            is_running: false,
            start_timestamp: None,
            elapsed_millis: elapsed,
            phase: Phase::Working,
            break_started: None,
        });
        self.broadcast(TimerEvent::state_changed(false, true));
    }

    /// Continue a paused timer; no-op while running
    pub fn resume(&self) {
        if self.is_running() {
            debug!("Resume ignored, timer already running");
            return;
        }
        self.start();
    }

    /// Stop the tick and zero all progress
    pub fn reset(&self) {
        self.disarm();
        info!("Resetting timer");
        self.persist(&TimerRecord::default());
        self.emit_time(format_time(self.durations.work_ms));
        self.broadcast(TimerEvent::state_changed(false, false));
    }

    /// One-second step for whichever sub-timer is active
    pub fn tick(&self) {
        let record = self.load();
        if !record.is_running {
            debug!("Tick while stopped, ignoring");
            return;
        }

        match record.phase {
            Phase::Working => self.work_tick(&record),
            Phase::OnBreak => self.break_tick(&record),
        }
    }

    /// Current timer view, remaining time floored at zero
    pub fn state(&self) -> TimerSnapshot {
        let record = self.load();
        match record.phase {
            Phase::OnBreak if record.is_running => {
                let elapsed = self.break_elapsed(&record);
                TimerSnapshot {
                    is_running: true,
                    is_paused: false,
                    elapsed_millis: 0,
                    current_time: format_time(self.durations.break_ms.saturating_sub(elapsed)),
                    phase: Phase::OnBreak,
                }
            }
            _ => {
                let elapsed = self.work_elapsed(&record);
                TimerSnapshot {
                    is_running: record.is_running,
                    is_paused: !record.is_running && elapsed > 0,
                    elapsed_millis: elapsed,
                    current_time: format_time(self.durations.work_ms.saturating_sub(elapsed)),
                    phase: Phase::Working,
                }
            }
        }
    }

    fn work_tick(&self, record: &TimerRecord) {
        let elapsed = self.work_elapsed(record);
        if elapsed >= self.durations.work_ms {
            self.begin_break();
        } else {
            self.emit_time(format_time(self.durations.work_ms - elapsed));
        }
    }

    fn break_tick(&self, record: &TimerRecord) {
        let Some(started) = record.break_started else {
            // Break without a start instant: count it from now
            self.persist(&TimerRecord {
                break_started: Some(self.clock.now_millis()),
                ..record.clone()
            });
            self.emit_time(format_time(self.durations.break_ms));
            return;
        };

        let elapsed = millis_between(started, self.clock.now_millis());
        if elapsed >= self.durations.break_ms {
            self.finish_break();
        } else {
            self.emit_time(format_time(self.durations.break_ms - elapsed));
        }
    }

    fn begin_break(&self) {
        self.disarm();
        info!("Work interval complete, starting break");
        self.emit_time(format_time(0));
        self.alert(Notice::BreakStart);

        self.persist(&TimerRecord {
            is_running: true,
            start_timestamp: None,
            elapsed_millis: 0,
            phase: Phase::OnBreak,
            break_started: Some(self.clock.now_millis()),
        });
        self.arm();
        self.emit_time(format_time(self.durations.break_ms));
    }

    fn finish_break(&self) {
        self.disarm();
        info!("Break complete, restarting work interval");
        self.emit_time(format_time(self.durations.work_ms));
        self.alert(Notice::BreakEnd);

        self.persist(&TimerRecord::default());
        self.start();
    }

    fn work_elapsed(&self, record: &TimerRecord) -> u64 {
        let elapsed = match (record.is_running, record.start_timestamp) {
            (true, Some(start)) => millis_between(start, self.clock.now_millis()),
            _ => record.elapsed_millis,
        };
        elapsed.min(self.durations.work_ms)
    }

    fn break_elapsed(&self, record: &TimerRecord) -> u64 {
        record
            .break_started
            .map(|started| millis_between(started, self.clock.now_millis()))
            .unwrap_or(0)
    }

    fn load(&self) -> TimerRecord {
        TimerRecord::load(self.store.as_ref())
    }

    fn persist(&self, record: &TimerRecord) {
        if let Err(e) = record.save(self.store.as_ref()) {
            error!("Failed to persist timer state: {}", e);
        }
    }

    fn arm(&self) {
        self.tick_armed.send_replace(true);
    }

    fn disarm(&self) {
        self.tick_armed.send_replace(false);
    }

    fn emit_time(&self, time: String) {
        self.notifier.set_badge(&time);
        self.broadcast(TimerEvent::update(time));
    }

    fn alert(&self, notice: Notice) {
        self.notifier.notify(notice);
        self.broadcast(TimerEvent::notification(notice));
    }

    fn broadcast(&self, event: TimerEvent) {
        if self.events.send(event).is_err() {
            debug!("No event subscribers");
        }
    }
}

fn millis_between(from: i64, to: i64) -> u64 {
    to.saturating_sub(from).max(0) as u64
}
