use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the system produces an Event.
///
/// The scheduler loop broadcasts these to subscribers (UI, notifier glue);
/// the CLI prints them as they fire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A `next` set reached its due time.
    SetDue {
        set_index: usize,
        at: DateTime<Utc>,
    },
    /// A set was started by the user.
    SetStarted {
        set_index: usize,
        at: DateTime<Utc>,
    },
    /// A set completed, either by the user or by the auto-complete guard.
    SetCompleted {
        set_index: usize,
        completion_time: String,
        at: DateTime<Utc>,
    },
    /// The calendar date changed and the day's sets were rebuilt.
    DayRollover {
        date: String,
        at: DateTime<Utc>,
    },
    /// The stored workout record changed and was persisted.
    WorkoutUpdated {
        date: String,
        at: DateTime<Utc>,
    },
}

/// Event timestamp for a given engine instant.
///
/// Out-of-range inputs fall back to the current time rather than panicking.
pub(crate) fn event_time(now_ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(now_ms).single().unwrap_or_else(Utc::now)
}
