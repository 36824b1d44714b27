//! Injectable wall-clock.
//!
//! The market-hours predicate and the candle cadence are both functions of
//! wall-clock time, so the simulator reads time through this trait instead
//! of calling `Local::now()` directly. Tests pin the instant with
//! [`FixedClock`].

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, Utc};

pub trait Clock: Send + Sync {
    /// Current local time. Local wall-clock stands in for exchange time;
    /// there is no timezone configuration.
    fn now(&self) -> DateTime<Local>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }

    /// Current unix time in seconds.
    fn unix_seconds(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock pinned to an instant, settable and advanceable from tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}
