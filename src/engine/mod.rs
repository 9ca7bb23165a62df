//! Timer engine
//!
//! The controller owns the work/break state machine; the gate decides when the
//! daily schedule should start or pause it. Both read and write the shared
//! key-value store, which is the only durable copy of their state.

pub mod controller;
pub mod events;
pub mod gate;

pub use controller::{TimerController, TimerSnapshot};
pub use events::TimerEvent;
pub use gate::{GateAction, ScheduleGate};

/// The single controller and the single gate that drives it
pub struct Engine {
    pub controller: TimerController,
    pub gate: ScheduleGate,
}

impl Engine {
    pub fn new(controller: TimerController, gate: ScheduleGate) -> Self {
        Self { controller, gate }
    }

    /// Run the gate against the controller
    pub fn evaluate_schedule(&self) -> GateAction {
        self.gate.evaluate(&self.controller)
    }
}
