mod config;
pub mod database;

pub use config::{Config, NotificationsConfig, WorkoutConfig};
pub use database::{WorkoutDb, WorkoutTx};

use std::path::PathBuf;

/// Returns `~/.config/setminder[-dev]/` based on SETMINDER_ENV.
///
/// Set SETMINDER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SETMINDER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("setminder-dev")
    } else {
        base_dir.join("setminder")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
