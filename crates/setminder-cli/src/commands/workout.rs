use clap::Subcommand;
use setminder_core::clock::{Clock, SystemClock};
use setminder_core::{Config, DailyWorkout, Event, LifecycleEngine, WorkoutDb};

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Print today's workout as JSON (after one evaluation pass)
    Status,
    /// Start a set
    Start {
        /// Set id (0-based); defaults to the set currently next or due
        #[arg(long)]
        id: Option<usize>,
    },
    /// Complete a set
    Complete {
        /// Set id (0-based); defaults to the active set
        #[arg(long)]
        id: Option<usize>,
    },
    /// Print the stored workout for a date
    Show {
        /// Date, YYYY-MM-DD
        date: String,
    },
}

#[derive(Clone, Copy)]
enum SetCommand {
    Start,
    Complete,
}

/// Load-or-create today's record, run one tick pass, persist if changed.
fn reconcile_today(
    db: &mut WorkoutDb,
    engine: &LifecycleEngine,
    clock: &dyn Clock,
) -> Result<(DailyWorkout, Vec<Event>), Box<dyn std::error::Error>> {
    let now = clock.now_ms();
    let today = clock.today();
    let tx = db.transaction()?;
    let stored = tx.get(&today)?;
    let (workout, outcome) = engine.reconcile(stored, now, &today);
    if outcome.changed {
        tx.put(&workout)?;
    }
    tx.commit()?;
    Ok((workout, outcome.events))
}

/// Reconcile, then apply a user action in the same transaction.
///
/// A rejected action still commits whatever the tick pass changed; the
/// action itself mutates nothing on failure.
fn apply_set_command(
    db: &mut WorkoutDb,
    engine: &LifecycleEngine,
    clock: &dyn Clock,
    id: Option<usize>,
    cmd: SetCommand,
) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let now = clock.now_ms();
    let today = clock.today();
    let tx = db.transaction()?;
    let (mut workout, outcome) = engine.reconcile(tx.get(&today)?, now, &today);

    let target = match cmd {
        SetCommand::Start => id.or_else(|| workout.leading_set().map(|s| s.id)),
        SetCommand::Complete => id.or_else(|| workout.active_set().map(|s| s.id)),
    };
    let Some(target) = target else {
        if outcome.changed {
            tx.put(&workout)?;
        }
        tx.commit()?;
        return Err(match cmd {
            SetCommand::Start => "no set is ready to start",
            SetCommand::Complete => "no set is active",
        }
        .into());
    };

    let result = match cmd {
        SetCommand::Start => engine.start_set(&mut workout, target, now),
        SetCommand::Complete => engine.complete_set(&mut workout, target, now),
    };
    match result {
        Ok(events) => {
            tx.put(&workout)?;
            tx.commit()?;
            let mut all = outcome.events;
            all.extend(events);
            Ok(all)
        }
        Err(e) => {
            if outcome.changed {
                tx.put(&workout)?;
            }
            tx.commit()?;
            Err(e.into())
        }
    }
}

fn print_events(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}

pub fn run(action: WorkoutAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let engine = LifecycleEngine::new(config.workout.plan());
    let mut db = WorkoutDb::open()?;
    let clock = SystemClock;

    match action {
        WorkoutAction::Status => {
            let (workout, events) = reconcile_today(&mut db, &engine, &clock)?;
            println!("{}", serde_json::to_string_pretty(&workout)?);
            print_events(&events)?;
        }
        WorkoutAction::Start { id } => {
            let events = apply_set_command(&mut db, &engine, &clock, id, SetCommand::Start)?;
            print_events(&events)?;
        }
        WorkoutAction::Complete { id } => {
            let events = apply_set_command(&mut db, &engine, &clock, id, SetCommand::Complete)?;
            print_events(&events)?;
        }
        WorkoutAction::Show { date } => {
            chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|_| format!("invalid date '{date}', expected YYYY-MM-DD"))?;
            match db.get(&date)? {
                Some(workout) => println!("{}", serde_json::to_string_pretty(&workout)?),
                None => println!("no workout recorded for {date}"),
            }
        }
    }

    Ok(())
}
