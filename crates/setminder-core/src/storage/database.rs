//! SQLite-based workout storage.
//!
//! One row per calendar day, keyed by date, with the full `DailyWorkout`
//! record stored as JSON. The scheduler loop and user actions both mutate
//! the same row; [`WorkoutDb::transaction`] hands out an IMMEDIATE
//! transaction so a read-modify-write cycle cannot interleave with another
//! writer on the same key.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::error::{CoreError, DatabaseError, Result};
use crate::workout::DailyWorkout;

use super::data_dir;

/// SQLite database holding one `DailyWorkout` per date.
pub struct WorkoutDb {
    conn: Connection,
}

impl WorkoutDb {
    /// Open the database at `~/.config/setminder/setminder.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("setminder.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS workouts (
                    date TEXT PRIMARY KEY,
                    data TEXT NOT NULL
                );",
            )
            .map_err(DatabaseError::from)
    }

    /// Fetch the workout stored for `date`, if any.
    pub fn get(&self, date: &str) -> Result<Option<DailyWorkout>> {
        get_row(&self.conn, date)
    }

    /// Insert or replace the workout for its date.
    pub fn put(&self, workout: &DailyWorkout) -> Result<()> {
        put_row(&self.conn, workout)
    }

    /// Begin an IMMEDIATE transaction for a read-modify-write cycle.
    ///
    /// Dropping the handle without [`WorkoutTx::commit`] rolls back.
    pub fn transaction(&mut self) -> Result<WorkoutTx<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DatabaseError::from)?;
        Ok(WorkoutTx { tx })
    }
}

/// An open read-modify-write cycle against the workout table.
pub struct WorkoutTx<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl WorkoutTx<'_> {
    pub fn get(&self, date: &str) -> Result<Option<DailyWorkout>> {
        get_row(&self.tx, date)
    }

    pub fn put(&self, workout: &DailyWorkout) -> Result<()> {
        put_row(&self.tx, workout)
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit().map_err(DatabaseError::from)?;
        Ok(())
    }
}

fn get_row(conn: &Connection, date: &str) -> Result<Option<DailyWorkout>> {
    let data: Option<String> = conn
        .query_row(
            "SELECT data FROM workouts WHERE date = ?1",
            params![date],
            |row| row.get(0),
        )
        .optional()
        .map_err(DatabaseError::from)?;

    match data {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| {
                CoreError::Database(DatabaseError::Corrupt {
                    date: date.to_string(),
                    source,
                })
            }),
        None => Ok(None),
    }
}

fn put_row(conn: &Connection, workout: &DailyWorkout) -> Result<()> {
    let data = serde_json::to_string(workout)?;
    conn.execute(
        "INSERT INTO workouts (date, data) VALUES (?1, ?2)
         ON CONFLICT(date) DO UPDATE SET data = excluded.data",
        params![workout.date, data],
    )
    .map_err(DatabaseError::from)?;
    Ok(())
}
