use std::sync::Arc;

use setminder_core::clock::SystemClock;
use setminder_core::notify::{Alert, Delivery, Notifier, NullNotifier};
use setminder_core::{Config, LifecycleEngine, NotifyError, SchedulerLoop, WorkoutDb};
use tracing_subscriber::EnvFilter;

/// Prints alerts to the terminal, ringing the bell.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, alert: &Alert) -> Result<Delivery, NotifyError> {
        println!("\x07{} {}", alert.title, alert.body);
        println!("  run `setminder workout start` to start now, or dismiss");
        Ok(Delivery::Delivered)
    }
}

/// Run the scheduler loop in the foreground until Ctrl-C.
pub fn run(interval: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let engine = LifecycleEngine::new(config.workout.plan());
    let db = WorkoutDb::open()?;
    let notifier: Box<dyn Notifier> = if config.notifications.enabled {
        Box::new(ConsoleNotifier)
    } else {
        Box::new(NullNotifier)
    };

    let scheduler = SchedulerLoop::new(db, engine, Arc::new(SystemClock), notifier)
        .with_interval_secs(interval.unwrap_or(config.tick_interval_secs));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        tokio::select! {
            _ = scheduler.run() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
            }
        }
    });
    Ok(())
}
