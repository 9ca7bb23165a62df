//! Periodic schedule evaluation

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::{engine::GateAction, state::AppState};

/// Background task that evaluates the schedule gate every `period`.
///
/// The first evaluation happens immediately, covering the boot-time check.
pub async fn schedule_poll_task(state: Arc<AppState>, period: Duration) {
    info!("Starting schedule poll task ({}s period)", period.as_secs());

    let mut interval = interval(period);

    loop {
        interval.tick().await;

        match state.evaluate_schedule() {
            Ok(GateAction::Started) => info!("Schedule window opened, timer started"),
            Ok(GateAction::Paused) => info!("Schedule window closed, timer paused"),
            Ok(action) => debug!("Schedule check: {:?}", action),
            Err(e) => warn!("Failed to evaluate schedule: {}", e),
        }
    }
}
