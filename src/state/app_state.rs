//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::{Durations, ScheduleDraft};
use crate::{
    engine::{Engine, GateAction, ScheduleGate, TimerController, TimerEvent, TimerSnapshot},
    services::{FanoutNotifier, LogNotifier, Notifier},
    store::KeyValueStore,
    utils::Clock,
};

/// Shared state handed to the HTTP handlers and the background tasks.
///
/// Every command, tick and schedule poll goes through the engine mutex, so
/// transitions never interleave.
pub struct AppState {
    engine: Mutex<Engine>,
    /// Mirrors the badge text for status queries
    badge: Arc<LogNotifier>,
    events: broadcast::Sender<TimerEvent>,
    tick_armed: watch::Receiver<bool>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Wire the controller and gate over a shared store and clock.
    ///
    /// `extra_notifier` receives alerts in addition to the built-in logging
    /// notifier that tracks the badge.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        extra_notifier: Option<Arc<dyn Notifier>>,
        durations: Durations,
        port: u16,
        host: String,
    ) -> Self {
        let badge = Arc::new(LogNotifier::new());
        let mut notifier = FanoutNotifier::new().with(badge.clone());
        if let Some(extra) = extra_notifier {
            notifier = notifier.with(extra);
        }

        let controller = TimerController::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            Arc::new(notifier),
            durations,
        );
        let events = controller.event_sender();
        let tick_armed = controller.tick_armed();
        let gate = ScheduleGate::new(store, clock);

        Self {
            engine: Mutex::new(Engine::new(controller, gate)),
            badge,
            events,
            tick_armed,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    fn engine(&self) -> Result<MutexGuard<'_, Engine>, String> {
        self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Run a user-visible command against the engine and record it
    fn command<F, R>(&self, action: &str, f: F) -> Result<R, String>
    where
        F: FnOnce(&Engine) -> R,
    {
        let engine = self.engine()?;
        let result = f(&*engine);
        drop(engine); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(result)
    }

    /// Lay down initial state on first boot and resume whatever was running
    pub fn bootstrap(&self) -> Result<(), String> {
        let engine = self.engine()?;
        engine.controller.initialize();
        engine.controller.restore();
        info!("Timer state restored");
        Ok(())
    }

    pub fn start_timer(&self) -> Result<TimerSnapshot, String> {
        self.command("startTimer", |engine| {
            engine.controller.start();
            engine.controller.state()
        })
    }

    pub fn pause_timer(&self) -> Result<TimerSnapshot, String> {
        self.command("pauseTimer", |engine| {
            engine.controller.pause();
            engine.controller.state()
        })
    }

    pub fn resume_timer(&self) -> Result<TimerSnapshot, String> {
        self.command("resumeTimer", |engine| {
            engine.controller.resume();
            engine.controller.state()
        })
    }

    pub fn reset_timer(&self) -> Result<TimerSnapshot, String> {
        self.command("resetTimer", |engine| {
            engine.controller.reset();
            engine.controller.state()
        })
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerSnapshot, String> {
        Ok(self.engine()?.controller.state())
    }

    /// Advance the active sub-timer by one tick
    pub fn tick(&self) -> Result<(), String> {
        self.engine()?.controller.tick();
        Ok(())
    }

    /// Save the schedule window; the outer error is a lock failure, the inner
    /// one a rejected or unsaved window
    pub fn update_schedule(&self, draft: &ScheduleDraft) -> Result<Result<GateAction, String>, String> {
        self.command("updateSchedule", |engine| {
            engine.gate
                .update_schedule(draft, &engine.controller)
                .map_err(|e| {
                    warn!("Schedule update rejected: {}", e);
                    e.to_string()
                })
        })
    }

    pub fn clear_schedule(&self) -> Result<(), String> {
        self.command("clearSchedule", |engine| engine.gate.clear_schedule())?
            .map_err(|e| e.to_string())
    }

    pub fn get_schedule(&self) -> Result<(ScheduleDraft, Option<bool>), String> {
        let engine = self.engine()?;
        Ok((engine.gate.draft(), engine.gate.in_schedule()))
    }

    /// Periodic schedule check
    pub fn evaluate_schedule(&self) -> Result<GateAction, String> {
        Ok(self.engine()?.evaluate_schedule())
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    /// Watch for the tick being armed or disarmed
    pub fn tick_armed(&self) -> watch::Receiver<bool> {
        self.tick_armed.clone()
    }

    pub fn badge(&self) -> String {
        self.badge.badge()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
