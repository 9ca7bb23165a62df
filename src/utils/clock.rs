//! Wall-clock access for the timer and the schedule gate

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Mutex,
};

use chrono::{Local, NaiveTime, Timelike, Utc};

/// Source of "now" for the controller and the gate.
///
/// Elapsed time is always derived from an absolute epoch instant, so the
/// controller only ever asks for milliseconds since the Unix epoch. The gate
/// needs the local time of day.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;

    /// Local time of day
    fn time_of_day(&self) -> NaiveTime;
}

/// Clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Manually advanced clock for deterministic tests
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
    time_of_day: Mutex<NaiveTime>,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
            time_of_day: Mutex::new(NaiveTime::default()),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set_time_of_day(&self, hour: u32, minute: u32) {
        if let (Ok(mut slot), Some(time)) = (
            self.time_of_day.lock(),
            NaiveTime::from_hms_opt(hour, minute, 0),
        ) {
            *slot = time;
        }
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }

    fn time_of_day(&self) -> NaiveTime {
        self.time_of_day
            .lock()
            .map(|time| *time)
            .unwrap_or(NaiveTime::default())
    }
}

/// Truncate a time of day to whole minutes, the granularity the gate works at
pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);
    }

    #[test]
    fn manual_clock_time_of_day() {
        let clock = ManualClock::new(0);
        clock.set_time_of_day(23, 30);
        assert_eq!(clock.time_of_day(), NaiveTime::from_hms_opt(23, 30, 0).unwrap());
    }

    #[test]
    fn truncation_drops_seconds() {
        let time = NaiveTime::from_hms_milli_opt(9, 59, 42, 731).unwrap();
        assert_eq!(truncate_to_minute(time), NaiveTime::from_hms_opt(9, 59, 0).unwrap());
    }
}
