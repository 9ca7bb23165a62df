//! Twenty-Twenty - A 20-20-20 eye-strain reminder daemon
//!
//! Runs a 20-minute work interval followed by a 20-second break, persists its
//! progress so restarts pick up where they left off, and can confine itself to
//! a daily time window.

pub mod api;
pub mod config;
pub mod engine;
pub mod services;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::{ScheduleGate, TimerController, TimerEvent};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
