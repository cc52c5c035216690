use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single set.
///
/// A set moves strictly forward: `future -> next -> due -> active ->
/// completed`. The `due` stop is skipped when the user starts a set before
/// its due time arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetState {
    Future,
    Next,
    Due,
    Active,
    Completed,
}

impl fmt::Display for SetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SetState::Future => "future",
            SetState::Next => "next",
            SetState::Due => "due",
            SetState::Active => "active",
            SetState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// One unit of exercise within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// Ordinal position in the day (0-based), fixed at creation.
    pub id: usize,
    pub state: SetState,
    /// Seconds remaining on the set timer. Display bookkeeping only --
    /// refreshed while the set is active, never a transition trigger.
    pub time_left: u32,
    /// Epoch milliseconds when the set went active.
    pub start_time: Option<i64>,
    /// Local wall-clock string recorded at completion.
    pub completion_time: Option<String>,
    /// Epoch milliseconds at which a `next` set becomes `due`.
    /// Only set while the set is `next` or `due`.
    pub due_time: Option<i64>,
}

impl WorkoutSet {
    /// Seconds left on the countdown at `now_ms`.
    ///
    /// Full duration until the set has been started, then counts down to
    /// zero and stays there.
    pub fn remaining_secs(&self, now_ms: i64, duration_secs: u32) -> u32 {
        match self.start_time {
            Some(start) => {
                let elapsed = (now_ms.saturating_sub(start).max(0) / 1000) as u64;
                duration_secs.saturating_sub(elapsed.min(u32::MAX as u64) as u32)
            }
            None => duration_secs,
        }
    }
}

/// Fixed parameters of a day's workout.
///
/// Defaults match the canonical plan: 8 sets of 45 minutes, spaced 45
/// minutes apart, first set due at 09:00 local, active sets auto-completed
/// after 10 minutes without user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub sets_per_day: usize,
    pub set_duration_min: u32,
    pub due_interval_min: u32,
    pub auto_complete_min: u32,
    /// Hour of the local day (0-23) at which the first set comes due.
    pub start_hour: u32,
}

impl Default for WorkoutPlan {
    fn default() -> Self {
        Self {
            sets_per_day: 8,
            set_duration_min: 45,
            due_interval_min: 45,
            auto_complete_min: 10,
            start_hour: 9,
        }
    }
}

impl WorkoutPlan {
    pub fn set_duration_secs(&self) -> u32 {
        self.set_duration_min.saturating_mul(60)
    }

    pub fn due_interval_ms(&self) -> i64 {
        i64::from(self.due_interval_min).saturating_mul(60_000)
    }

    pub fn auto_complete_ms(&self) -> i64 {
        i64::from(self.auto_complete_min).saturating_mul(60_000)
    }
}

/// One calendar day's workout record, keyed by `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWorkout {
    /// Local calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Ordered sets, indexed by `id`.
    pub sets: Vec<WorkoutSet>,
}

impl DailyWorkout {
    /// The single set currently in the leading role (`next`, `due` or
    /// `active`). `None` once the whole day is completed.
    pub fn leading_set(&self) -> Option<&WorkoutSet> {
        self.sets
            .iter()
            .find(|s| !matches!(s.state, SetState::Future | SetState::Completed))
    }

    pub fn active_set(&self) -> Option<&WorkoutSet> {
        self.sets.iter().find(|s| s.state == SetState::Active)
    }

    pub fn completed_count(&self) -> usize {
        self.sets
            .iter()
            .filter(|s| s.state == SetState::Completed)
            .count()
    }

    pub fn is_finished(&self) -> bool {
        self.completed_count() == self.sets.len()
    }
}
