//! One-second timer tick

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task that ticks the controller once a second while armed.
///
/// Each arm restarts the interval from scratch and a disarm parks the task,
/// so there is never more than one tick in flight.
pub async fn tick_task(state: Arc<AppState>) {
    info!("Starting tick task");

    let mut armed_rx = state.tick_armed();

    loop {
        let armed = *armed_rx.borrow_and_update();
        if !armed {
            debug!("Tick disarmed, waiting");
            if armed_rx.changed().await.is_err() {
                info!("Tick channel closed, stopping tick task");
                return;
            }
            continue;
        }

        debug!("Tick armed");
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = state.tick() {
                        error!("Failed to tick timer: {}", e);
                    }
                }

                // Re-armed or disarmed, restart from the top
                changed = armed_rx.changed() => {
                    if changed.is_err() {
                        info!("Tick channel closed, stopping tick task");
                        return;
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::TimerEvent,
        state::Durations,
        store::MemoryStore,
        utils::{ManualClock, SystemClock},
    };
    use tokio::sync::broadcast;

    fn update_count(events: &mut broadcast::Receiver<TimerEvent>) -> usize {
        let mut count = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, TimerEvent::UpdateTimer { .. }) {
                count += 1;
            }
        }
        count
    }

    #[tokio::test]
    async fn ticks_while_armed() {
        let state = Arc::new(AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
            None,
            Durations::default(),
            0,
            "127.0.0.1".to_string(),
        ));
        let mut events = state.subscribe_events();
        let handle = tokio::spawn(tick_task(Arc::clone(&state)));

        state.start_timer().unwrap();
        assert_eq!(events.recv().await.unwrap(), TimerEvent::state_changed(true, false));
        assert_eq!(events.recv().await.unwrap(), TimerEvent::update("20:00"));

        let next = tokio::time::timeout(Duration::from_secs(3), events.recv())
            .await
            .expect("tick within the period")
            .unwrap();
        assert!(matches!(next, TimerEvent::UpdateTimer { .. }));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_previous_tick() {
        let state = Arc::new(AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(1_700_000_000_000)),
            None,
            Durations::default(),
            0,
            "127.0.0.1".to_string(),
        ));
        let handle = tokio::spawn(tick_task(Arc::clone(&state)));
        tokio::task::yield_now().await;
        let mut events = state.subscribe_events();

        // Five starts 300ms apart, each one pushes the first tick back
        for _ in 0..5 {
            state.start_timer().unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        assert_eq!(update_count(&mut events), 5);

        // Last arm was at 1.2s, so ticks land at 2.2s, 3.2s and 4.2s
        tokio::time::sleep(Duration::from_millis(3_100)).await;
        assert_eq!(update_count(&mut events), 3);

        handle.abort();
    }
}
