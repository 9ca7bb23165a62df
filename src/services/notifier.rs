//! Notifier trait and the in-process implementations

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, warn};

/// The two user-visible alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Notice {
    BreakStart,
    BreakEnd,
}

impl Notice {
    pub fn id(&self) -> &'static str {
        match self {
            Notice::BreakStart => "breakTimeNotification",
            Notice::BreakEnd => "breakEndNotification",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Notice::BreakStart => "Take a break!",
            Notice::BreakEnd => "Break time over",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Notice::BreakStart => {
                "It's time to take a break. Look at something 20 feet away for 20 seconds."
            }
            Notice::BreakEnd => "Time to get back to work! The 20-20-20 timer will restart.",
        }
    }
}

/// Sink for alerts and badge text
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn set_badge(&self, text: &str);
}

/// Logs alerts and keeps the current badge text for status queries
#[derive(Debug, Default)]
pub struct LogNotifier {
    badge: Mutex<String>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn badge(&self) -> String {
        self.badge.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        info!("{}: {}", notice.title(), notice.message());
    }

    fn set_badge(&self, text: &str) {
        match self.badge.lock() {
            Ok(mut badge) => {
                debug!("Badge: {}", text);
                *badge = text.to_string();
            }
            Err(e) => warn!("Failed to lock badge: {}", e),
        }
    }
}

/// Forwards every call to each inner notifier in order
#[derive(Default)]
pub struct FanoutNotifier {
    inner: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.inner.push(notifier);
        self
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, notice: Notice) {
        for notifier in &self.inner {
            notifier.notify(notice);
        }
    }

    fn set_badge(&self, text: &str) {
        for notifier in &self.inner {
            notifier.set_badge(text);
        }
    }
}
