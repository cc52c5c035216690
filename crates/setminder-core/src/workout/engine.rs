//! Set lifecycle engine.
//!
//! The engine is a wall-clock-based state machine. It holds no time source
//! and no storage handle - the caller supplies `now` (epoch milliseconds)
//! and `today` (local calendar date) on every call, and persists the record
//! itself.
//!
//! ## State transitions
//!
//! ```text
//! future -> next -> due -> active -> completed
//!                    \______________^  (start before due skips `due`)
//! ```
//!
//! One evaluation pass per `tick` invocation; invoking it twice with the
//! same instant and no intervening action is a no-op, so redundant or
//! concurrent driving is safe.

use super::set::{DailyWorkout, SetState, WorkoutPlan, WorkoutSet};
use crate::clock::{local_hour_ms, local_time_string};
use crate::error::TransitionError;
use crate::events::{event_time, Event};

/// Result of one tick pass.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Whether the record was mutated and needs to be persisted.
    /// Display-only countdown refreshes do not count.
    pub changed: bool,
    pub events: Vec<Event>,
}

/// Core lifecycle state machine.
#[derive(Debug, Clone, Default)]
pub struct LifecycleEngine {
    plan: WorkoutPlan,
}

impl LifecycleEngine {
    pub fn new(plan: WorkoutPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    // ── Day construction ─────────────────────────────────────────────

    /// Build a fresh day: set 0 is `next` and comes due at the plan's
    /// start hour, all later sets are `future`.
    pub fn new_workout(&self, date: &str) -> DailyWorkout {
        let duration = self.plan.set_duration_secs();
        let sets = (0..self.plan.sets_per_day)
            .map(|i| WorkoutSet {
                id: i,
                state: if i == 0 { SetState::Next } else { SetState::Future },
                time_left: duration,
                start_time: None,
                completion_time: None,
                due_time: if i == 0 {
                    local_hour_ms(date, self.plan.start_hour)
                } else {
                    None
                },
            })
            .collect();
        DailyWorkout {
            date: date.to_string(),
            sets,
        }
    }

    /// Load-or-create semantics over an optional stored record, then run
    /// one tick pass.
    ///
    /// An absent record counts as a day rollover: the fresh day must be
    /// persisted even if the tick itself changes nothing further.
    pub fn reconcile(
        &self,
        stored: Option<DailyWorkout>,
        now_ms: i64,
        today: &str,
    ) -> (DailyWorkout, TickOutcome) {
        match stored {
            Some(mut workout) => {
                let outcome = self.tick(&mut workout, now_ms, today);
                (workout, outcome)
            }
            None => {
                let mut workout = self.new_workout(today);
                let mut outcome = self.tick(&mut workout, now_ms, today);
                outcome.changed = true;
                outcome.events.insert(
                    0,
                    Event::DayRollover {
                        date: today.to_string(),
                        at: event_time(now_ms),
                    },
                );
                (workout, outcome)
            }
        }
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Run one evaluation pass against `now_ms` / `today`.
    ///
    /// The rollover check runs before anything else; an arbitrarily long
    /// gap between ticks resolves every pending transition (rollover, due,
    /// auto-complete plus promotion) in this single pass.
    pub fn tick(&self, workout: &mut DailyWorkout, now_ms: i64, today: &str) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if workout.date != today {
            *workout = self.new_workout(today);
            outcome.changed = true;
            outcome.events.push(Event::DayRollover {
                date: today.to_string(),
                at: event_time(now_ms),
            });
        }

        for i in 0..workout.sets.len() {
            let (state, due_time, start_time) = {
                let s = &workout.sets[i];
                (s.state, s.due_time, s.start_time)
            };
            match state {
                SetState::Next => {
                    if due_time.is_some_and(|due| now_ms >= due) {
                        workout.sets[i].state = SetState::Due;
                        outcome.changed = true;
                        outcome.events.push(Event::SetDue {
                            set_index: i,
                            at: event_time(now_ms),
                        });
                    }
                }
                SetState::Active => {
                    let Some(start) = start_time else { continue };
                    if now_ms.saturating_sub(start) >= self.plan.auto_complete_ms() {
                        self.complete_at(workout, i, now_ms, &mut outcome.events);
                        outcome.changed = true;
                    } else {
                        // Countdown refresh only; not a persistence trigger.
                        let left =
                            workout.sets[i].remaining_secs(now_ms, self.plan.set_duration_secs());
                        workout.sets[i].time_left = left;
                    }
                }
                _ => {}
            }
        }

        outcome
    }

    // ── User actions ─────────────────────────────────────────────────

    /// Start a set. Permitted from `next` or `due`; the "start now"
    /// notification action lands here as well.
    pub fn start_set(
        &self,
        workout: &mut DailyWorkout,
        id: usize,
        now_ms: i64,
    ) -> Result<Vec<Event>, TransitionError> {
        let len = workout.sets.len();
        let set = workout
            .sets
            .get_mut(id)
            .ok_or(TransitionError::UnknownSet { id, len })?;
        match set.state {
            SetState::Next | SetState::Due => {
                set.state = SetState::Active;
                set.start_time = Some(now_ms);
                set.due_time = None;
                Ok(vec![Event::SetStarted {
                    set_index: id,
                    at: event_time(now_ms),
                }])
            }
            state => Err(TransitionError::InvalidTransition {
                id,
                state,
                action: "start",
            }),
        }
    }

    /// Mark an active set complete.
    pub fn complete_set(
        &self,
        workout: &mut DailyWorkout,
        id: usize,
        now_ms: i64,
    ) -> Result<Vec<Event>, TransitionError> {
        let len = workout.sets.len();
        let state = workout
            .sets
            .get(id)
            .ok_or(TransitionError::UnknownSet { id, len })?
            .state;
        if state != SetState::Active {
            return Err(TransitionError::InvalidTransition {
                id,
                state,
                action: "complete",
            });
        }
        let mut events = Vec::new();
        self.complete_at(workout, id, now_ms, &mut events);
        Ok(events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Complete set `id` and promote its successor if that one is still
    /// `future`. The promoted set comes due one interval after this
    /// completion instant.
    fn complete_at(
        &self,
        workout: &mut DailyWorkout,
        id: usize,
        now_ms: i64,
        events: &mut Vec<Event>,
    ) {
        let completion = local_time_string(now_ms);
        {
            let set = &mut workout.sets[id];
            set.state = SetState::Completed;
            set.completion_time = Some(completion.clone());
            set.due_time = None;
        }
        events.push(Event::SetCompleted {
            set_index: id,
            completion_time: completion,
            at: event_time(now_ms),
        });

        if let Some(next) = workout.sets.get_mut(id + 1) {
            if next.state == SetState::Future {
                next.state = SetState::Next;
                next.due_time = Some(now_ms + self.plan.due_interval_ms());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::local_hour_ms;
    use proptest::prelude::*;

    const DAY: &str = "2026-08-06";
    const MIN_MS: i64 = 60_000;

    fn engine() -> LifecycleEngine {
        LifecycleEngine::default()
    }

    /// Ordering invariant from the data model: completed prefix, one
    /// leading set, future suffix.
    fn ordering_holds(w: &DailyWorkout) -> bool {
        let leaders = w
            .sets
            .iter()
            .filter(|s| !matches!(s.state, SetState::Future | SetState::Completed))
            .count();
        match w
            .sets
            .iter()
            .position(|s| !matches!(s.state, SetState::Future | SetState::Completed))
        {
            Some(i) => {
                leaders == 1
                    && w.sets[..i].iter().all(|s| s.state == SetState::Completed)
                    && w.sets[i + 1..].iter().all(|s| s.state == SetState::Future)
            }
            None => leaders == 0,
        }
    }

    #[test]
    fn new_day_has_one_next_and_seven_future() {
        let w = engine().new_workout(DAY);
        assert_eq!(w.sets.len(), 8);
        assert_eq!(w.sets[0].state, SetState::Next);
        assert_eq!(w.sets[0].due_time, local_hour_ms(DAY, 9));
        assert_eq!(w.sets[0].time_left, 2700);
        for s in &w.sets[1..] {
            assert_eq!(s.state, SetState::Future);
            assert_eq!(s.due_time, None);
        }
    }

    #[test]
    fn next_becomes_due_exactly_at_due_time() {
        let e = engine();
        let mut w = e.new_workout(DAY);
        let due = 1_000_000;
        w.sets[0].due_time = Some(due);

        let outcome = e.tick(&mut w, due - 1, DAY);
        assert!(!outcome.changed);
        assert_eq!(w.sets[0].state, SetState::Next);

        let outcome = e.tick(&mut w, due, DAY);
        assert!(outcome.changed);
        assert_eq!(w.sets[0].state, SetState::Due);
        assert!(matches!(
            outcome.events.as_slice(),
            [Event::SetDue { set_index: 0, .. }]
        ));
    }

    #[test]
    fn start_permitted_from_next_and_due() {
        let e = engine();
        let mut w = e.new_workout(DAY);
        let events = e.start_set(&mut w, 0, 500).unwrap();
        assert_eq!(w.sets[0].state, SetState::Active);
        assert_eq!(w.sets[0].start_time, Some(500));
        assert_eq!(w.sets[0].due_time, None);
        assert!(matches!(
            events.as_slice(),
            [Event::SetStarted { set_index: 0, .. }]
        ));

        let mut w = e.new_workout(DAY);
        w.sets[0].state = SetState::Due;
        e.start_set(&mut w, 0, 500).unwrap();
        assert_eq!(w.sets[0].state, SetState::Active);
    }

    #[test]
    fn start_rejected_outside_next_or_due() {
        let e = engine();
        let mut w = e.new_workout(DAY);
        assert!(matches!(
            e.start_set(&mut w, 3, 0),
            Err(TransitionError::InvalidTransition {
                id: 3,
                state: SetState::Future,
                ..
            })
        ));
        // Untouched on failure.
        assert_eq!(w.sets[3].state, SetState::Future);

        e.start_set(&mut w, 0, 0).unwrap();
        assert!(e.start_set(&mut w, 0, 1).is_err());
        assert!(matches!(
            e.start_set(&mut w, 42, 0),
            Err(TransitionError::UnknownSet { id: 42, len: 8 })
        ));
    }

    #[test]
    fn complete_requires_active() {
        let e = engine();
        let mut w = e.new_workout(DAY);
        assert!(matches!(
            e.complete_set(&mut w, 0, 0),
            Err(TransitionError::InvalidTransition { action: "complete", .. })
        ));
        e.start_set(&mut w, 0, 0).unwrap();
        assert!(e.complete_set(&mut w, 0, 1000).is_ok());
        assert_eq!(w.sets[0].state, SetState::Completed);
    }

    #[test]
    fn completing_promotes_successor_with_interval_due_time() {
        let e = engine();
        let mut w = e.new_workout(DAY);
        let start = 10_000_000;
        e.start_set(&mut w, 0, start).unwrap();
        let done = start + 5 * MIN_MS;
        let events = e.complete_set(&mut w, 0, done).unwrap();

        assert_eq!(w.sets[0].state, SetState::Completed);
        assert_eq!(w.sets[0].completion_time.as_deref(), Some(crate::clock::local_time_string(done).as_str()));
        assert_eq!(w.sets[1].state, SetState::Next);
        assert_eq!(w.sets[1].due_time, Some(done + 45 * MIN_MS));
        assert!(matches!(
            events.as_slice(),
            [Event::SetCompleted { set_index: 0, .. }]
        ));
    }

    #[test]
    fn completing_last_set_promotes_nothing() {
        let e = engine();
        let mut w = e.new_workout(DAY);
        for s in &mut w.sets[..7] {
            s.state = SetState::Completed;
            s.due_time = None;
        }
        w.sets[7].state = SetState::Due;
        e.start_set(&mut w, 7, 0).unwrap();
        e.complete_set(&mut w, 7, 1000).unwrap();
        assert!(w.is_finished());
    }

    #[test]
    fn active_auto_completes_at_ten_minutes() {
        let e = engine();
        let mut w = e.new_workout(DAY);
        let start = 2_000_000;
        e.start_set(&mut w, 0, start).unwrap();

        let outcome = e.tick(&mut w, start + 10 * MIN_MS - 1, DAY);
        assert!(!outcome.changed);
        assert_eq!(w.sets[0].state, SetState::Active);

        let outcome = e.tick(&mut w, start + 10 * MIN_MS, DAY);
        assert!(outcome.changed);
        assert_eq!(w.sets[0].state, SetState::Completed);
        // Successor promoted off the auto-completion instant.
        assert_eq!(w.sets[1].state, SetState::Next);
        assert_eq!(w.sets[1].due_time, Some(start + 10 * MIN_MS + 45 * MIN_MS));
    }

    #[test]
    fn tick_refreshes_countdown_without_dirtying_record() {
        let e = engine();
        let mut w = e.new_workout(DAY);
        let start = 3_000_000;
        e.start_set(&mut w, 0, start).unwrap();

        let outcome = e.tick(&mut w, start + 2 * MIN_MS, DAY);
        assert!(!outcome.changed);
        assert_eq!(w.sets[0].time_left, 2700 - 120);
    }

    #[test]
    fn rollover_replaces_sets_before_anything_else() {
        let e = engine();
        let mut w = e.new_workout("2026-08-05");
        e.start_set(&mut w, 0, 0).unwrap();

        let due = local_hour_ms(DAY, 9).unwrap();
        let outcome = e.tick(&mut w, due - MIN_MS, DAY);
        assert!(outcome.changed);
        assert_eq!(w.date, DAY);
        assert_eq!(w.sets[0].state, SetState::Next);
        assert_eq!(w.sets[0].due_time, Some(due));
        assert!(w.sets[1..].iter().all(|s| s.state == SetState::Future));
        assert!(matches!(
            outcome.events.as_slice(),
            [Event::DayRollover { .. }]
        ));
    }

    #[test]
    fn rollover_past_start_hour_goes_due_in_same_pass() {
        let e = engine();
        let mut w = e.new_workout("2026-08-05");
        let now = local_hour_ms(DAY, 9).unwrap() + 1000;
        let outcome = e.tick(&mut w, now, DAY);
        assert_eq!(w.sets[0].state, SetState::Due);
        assert!(matches!(
            outcome.events.as_slice(),
            [Event::DayRollover { .. }, Event::SetDue { set_index: 0, .. }]
        ));
    }

    #[test]
    fn long_gap_resolves_auto_complete_and_promotion_in_one_pass() {
        let e = engine();
        let mut w = e.new_workout(DAY);
        e.start_set(&mut w, 0, 0).unwrap();

        // Hours later, one tick settles everything that is pending.
        let now = 3 * 60 * MIN_MS;
        let outcome = e.tick(&mut w, now, DAY);
        assert_eq!(w.sets[0].state, SetState::Completed);
        assert_eq!(w.sets[1].state, SetState::Next);
        assert_eq!(w.sets[1].due_time, Some(now + 45 * MIN_MS));
        assert!(outcome.changed);
    }

    #[test]
    fn tick_is_idempotent_for_a_fixed_instant() {
        let e = engine();
        let mut w = e.new_workout(DAY);
        let now = local_hour_ms(DAY, 9).unwrap() + 1000;

        let first = e.tick(&mut w, now, DAY);
        assert!(first.changed);
        let snapshot = w.clone();

        let second = e.tick(&mut w, now, DAY);
        assert!(!second.changed);
        assert!(second.events.is_empty());
        assert_eq!(w, snapshot);
    }

    #[test]
    fn reconcile_creates_and_settles_a_missing_day() {
        let e = engine();
        let now = local_hour_ms(DAY, 9).unwrap() + 1000;
        let (w, outcome) = e.reconcile(None, now, DAY);
        assert!(outcome.changed);
        assert_eq!(w.date, DAY);
        assert_eq!(w.sets[0].state, SetState::Due);
        assert!(matches!(
            outcome.events.as_slice(),
            [Event::DayRollover { .. }, Event::SetDue { .. }]
        ));

        // A stored, current record reconciles to a no-op.
        let (w2, outcome) = e.reconcile(Some(w.clone()), now, DAY);
        assert!(!outcome.changed);
        assert_eq!(w2, w);
    }

    proptest! {
        /// Random interleavings of ticks, starts, completions and clock
        /// advances never break the ordering invariant, and a tick pair at
        /// any instant is idempotent.
        #[test]
        fn random_walk_preserves_ordering(ops in prop::collection::vec((0u8..3, 0i64..180), 1..60)) {
            let e = engine();
            let mut w = e.new_workout(DAY);
            let mut now = local_hour_ms(DAY, 9).unwrap_or(0) - 60 * MIN_MS;

            for (op, advance_min) in ops {
                now += advance_min * MIN_MS;
                match op {
                    0 => {
                        let _ = e.tick(&mut w, now, DAY);
                        let again = e.tick(&mut w, now, DAY);
                        prop_assert!(!again.changed);
                        prop_assert!(again.events.is_empty());
                    }
                    1 => {
                        if let Some(id) = w.leading_set().map(|s| s.id) {
                            let _ = e.start_set(&mut w, id, now);
                        }
                    }
                    _ => {
                        if let Some(id) = w.active_set().map(|s| s.id) {
                            let _ = e.complete_set(&mut w, id, now);
                        }
                    }
                }
                prop_assert!(ordering_holds(&w), "ordering broken: {:?}", w);
            }
        }
    }
}
