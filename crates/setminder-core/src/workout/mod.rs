mod engine;
mod set;

pub use engine::{LifecycleEngine, TickOutcome};
pub use set::{DailyWorkout, SetState, WorkoutPlan, WorkoutSet};
