//! # Setminder Core Library
//!
//! This library provides the core business logic for Setminder, a daily
//! squat-set tracker. A day is a fixed sequence of eight 45-minute sets;
//! each set advances through `future -> next -> due -> active -> completed`
//! and the user is alerted when a set comes due.
//!
//! ## Architecture
//!
//! - **Lifecycle Engine**: a wall-clock-based state machine; the caller
//!   supplies the timestamp on every call and persists the result
//! - **Storage**: SQLite workout records (one per calendar day, keyed by
//!   date) and TOML-based configuration
//! - **Scheduler**: a tokio driver that reconciles today's record on a
//!   coarse interval and dispatches effects
//! - **Notifier**: pluggable delivery of due-set alerts
//!
//! ## Key Components
//!
//! - [`LifecycleEngine`]: core set state machine
//! - [`WorkoutDb`]: per-date workout persistence
//! - [`SchedulerLoop`]: periodic reconciliation driver
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod scheduler;
pub mod storage;
pub mod workout;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, NotifyError, TransitionError};
pub use events::Event;
pub use notify::{Alert, AlertAction, Delivery, LogNotifier, Notifier, NullNotifier};
pub use scheduler::SchedulerLoop;
pub use storage::{Config, WorkoutDb};
pub use workout::{DailyWorkout, LifecycleEngine, SetState, TickOutcome, WorkoutPlan, WorkoutSet};
