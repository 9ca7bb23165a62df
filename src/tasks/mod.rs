//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod schedule_poll;
pub mod ticker;

// Re-export main functions
pub use schedule_poll::schedule_poll_task;
pub use ticker::tick_task;
