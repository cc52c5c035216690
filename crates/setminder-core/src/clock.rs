//! Wall-clock abstraction.
//!
//! The lifecycle engine is pure given a timestamp; everything that needs
//! "now" goes through [`Clock`] so tests can inject fixed or advancing time.

use std::sync::Mutex;

use chrono::{Local, NaiveDate, TimeZone, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current time as epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Current local calendar date, `YYYY-MM-DD`. Local, not UTC -- day
    /// rollover follows the user's wall clock.
    fn today(&self) -> String;
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }
}

/// A settable clock for tests and simulations.
#[derive(Debug)]
pub struct FixedClock {
    inner: Mutex<(i64, String)>,
}

impl FixedClock {
    pub fn new(now_ms: i64, date: &str) -> Self {
        Self {
            inner: Mutex::new((now_ms, date.to_string())),
        }
    }

    pub fn set(&self, now_ms: i64, date: &str) {
        let mut inner = self.inner.lock().expect("clock lock poisoned");
        *inner = (now_ms, date.to_string());
    }

    pub fn advance_ms(&self, delta: i64) {
        let mut inner = self.inner.lock().expect("clock lock poisoned");
        inner.0 += delta;
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.inner.lock().expect("clock lock poisoned").0
    }

    fn today(&self) -> String {
        self.inner.lock().expect("clock lock poisoned").1.clone()
    }
}

/// Epoch milliseconds for `date` at `hour`:00 local time.
///
/// Returns `None` when the date string does not parse or the hour is out of
/// range. DST gaps resolve to the earliest valid instant.
pub fn local_hour_ms(date: &str, hour: u32) -> Option<i64> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let naive = day.and_hms_opt(hour, 0, 0)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Local wall-clock time string for an epoch-millisecond timestamp.
pub fn local_time_string(now_ms: i64) -> String {
    match Utc.timestamp_millis_opt(now_ms).single() {
        Some(dt) => dt.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => String::new(),
    }
}
