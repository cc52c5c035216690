//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Workout plan parameters (set count, durations, daily start hour)
//! - Notification preferences
//! - Scheduler tick interval
//!
//! Configuration is stored at `~/.config/setminder/config.toml`.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::workout::WorkoutPlan;

/// Workout plan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutConfig {
    #[serde(default = "default_sets_per_day")]
    pub sets_per_day: usize,
    #[serde(default = "default_set_duration")]
    pub set_duration_min: u32,
    #[serde(default = "default_due_interval")]
    pub due_interval_min: u32,
    #[serde(default = "default_auto_complete")]
    pub auto_complete_min: u32,
    /// Local hour (0-23) at which the first set of the day comes due.
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/setminder/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workout: WorkoutConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Seconds between scheduler loop evaluations.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
}

// Default functions
fn default_sets_per_day() -> usize {
    8
}
fn default_set_duration() -> u32 {
    45
}
fn default_due_interval() -> u32 {
    45
}
fn default_auto_complete() -> u32 {
    10
}
fn default_start_hour() -> u32 {
    9
}
fn default_tick_interval() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            sets_per_day: default_sets_per_day(),
            set_duration_min: default_set_duration(),
            due_interval_min: default_due_interval(),
            auto_complete_min: default_auto_complete(),
            start_hour: default_start_hour(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workout: WorkoutConfig::default(),
            notifications: NotificationsConfig::default(),
            tick_interval_secs: default_tick_interval(),
        }
    }
}

impl WorkoutConfig {
    /// Engine parameters for this configuration.
    pub fn plan(&self) -> WorkoutPlan {
        WorkoutPlan {
            sets_per_day: self.sets_per_day,
            set_duration_min: self.set_duration_min,
            due_interval_min: self.due_interval_min,
            auto_complete_min: self.auto_complete_min,
            start_hour: self.start_hour,
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/setminder"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the default config on first run.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as a string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "workout.sets_per_day" => self.workout.sets_per_day.to_string(),
            "workout.set_duration_min" => self.workout.set_duration_min.to_string(),
            "workout.due_interval_min" => self.workout.due_interval_min.to_string(),
            "workout.auto_complete_min" => self.workout.auto_complete_min.to_string(),
            "workout.start_hour" => self.workout.start_hour.to_string(),
            "notifications.enabled" => self.notifications.enabled.to_string(),
            "tick_interval_secs" => self.tick_interval_secs.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "workout.sets_per_day" => self.workout.sets_per_day = parse(key, value)?,
            "workout.set_duration_min" => self.workout.set_duration_min = parse(key, value)?,
            "workout.due_interval_min" => self.workout.due_interval_min = parse(key, value)?,
            "workout.auto_complete_min" => self.workout.auto_complete_min = parse(key, value)?,
            "workout.start_hour" => {
                let hour: u32 = parse(key, value)?;
                if hour > 23 {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("hour {hour} out of range 0-23"),
                    });
                }
                self.workout.start_hour = hour;
            }
            "notifications.enabled" => self.notifications.enabled = parse(key, value)?,
            "tick_interval_secs" => self.tick_interval_secs = parse(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.save()
    }
}
