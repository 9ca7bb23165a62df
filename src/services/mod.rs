//! Notification delivery
//!
//! The controller only knows the `Notifier` trait. Concrete notifiers log,
//! remember the badge text, or hand the alert to a desktop command.

pub mod command;
pub mod notifier;

// Re-export main types
pub use command::{check_command_available, CommandNotifier};
pub use notifier::{FanoutNotifier, LogNotifier, Notice, Notifier};
