//! Periodic driver for the set lifecycle.
//!
//! Each tick fetches today's workout (creating it on a new day), runs one
//! engine pass inside a store transaction, persists the record when it
//! changed, and dispatches effects: due alerts to the [`Notifier`], every
//! event to broadcast subscribers.
//!
//! The loop has no timing authority of its own - transitions are decided
//! entirely by the engine against wall-clock time, so it is safe to drive
//! redundantly (interval timer plus wake events) or to miss ticks for
//! hours; the next pass reconciles whatever is pending.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::events::{event_time, Event};
use crate::notify::{Alert, Delivery, Notifier};
use crate::storage::WorkoutDb;
use crate::workout::LifecycleEngine;

/// Default interval between scheduler ticks (seconds).
pub const TICK_INTERVAL_SECS: u64 = 60;

/// Broadcast capacity for effect subscribers.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Background scheduler that reconciles today's workout on an interval.
pub struct SchedulerLoop {
    db: WorkoutDb,
    engine: LifecycleEngine,
    clock: Arc<dyn Clock>,
    notifier: Box<dyn Notifier>,
    event_tx: broadcast::Sender<Event>,
    interval_secs: u64,
}

impl SchedulerLoop {
    pub fn new(
        db: WorkoutDb,
        engine: LifecycleEngine,
        clock: Arc<dyn Clock>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            db,
            engine,
            clock,
            notifier,
            event_tx,
            interval_secs: TICK_INTERVAL_SECS,
        }
    }

    /// Override the tick interval.
    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs.max(1);
        self
    }

    /// Subscribe to the effect stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// One full cycle: transactional read-modify-write, then dispatch.
    ///
    /// Storage errors abort the cycle before anything is dispatched; the
    /// record is never left half-written.
    pub fn tick_once(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        let today = self.clock.today();

        let tx = self.db.transaction()?;
        let stored = tx.get(&today)?;
        let (workout, outcome) = self.engine.reconcile(stored, now, &today);
        if outcome.changed {
            tx.put(&workout)?;
        }
        tx.commit()?;

        for event in &outcome.events {
            if let Event::SetDue { set_index, .. } = event {
                self.dispatch_alert(*set_index);
            }
            let _ = self.event_tx.send(event.clone());
        }
        if outcome.changed {
            debug!(date = %workout.date, "workout persisted");
            let _ = self.event_tx.send(Event::WorkoutUpdated {
                date: workout.date.clone(),
                at: event_time(now),
            });
        }
        Ok(())
    }

    /// Best-effort alert delivery; failures are logged, never propagated.
    fn dispatch_alert(&self, set_index: usize) {
        let alert = Alert::due_set(set_index);
        match self.notifier.notify(&alert) {
            Ok(Delivery::Delivered) => debug!(set_index, "due alert delivered"),
            Ok(Delivery::Suppressed) => debug!(set_index, "due alert suppressed"),
            Err(e) => warn!(set_index, "due alert failed: {e}"),
        }
    }

    /// Drive ticks until the task is dropped.
    ///
    /// The first interval tick completes immediately, so state is
    /// reconciled on activation rather than one full interval later. Tick
    /// errors are logged and retried on the next interval; the loop never
    /// crashes.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.tick_once() {
                warn!("tick failed, retrying next interval: {e}");
            }
        }
    }
}
