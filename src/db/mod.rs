//! Database module - SQLite storage for workouts and logged sets

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::analytics::weekly_volume::TrackerCheckpoint;
use crate::calendar::Calendar;
use crate::error::StoreError;
use crate::exercises::get_all_exercises;
use crate::store::{DailyVolumePoint, MuscleLastTrained, PersonalBestEntry, SetRecord, TrendSet, WorkoutStore};

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseRow {
    pub id: i64,
    pub name: String,
    pub target_muscle: String,
}

const WORKING: &str = "s.is_complete = 1 AND s.is_warmup = 0 AND s.weight IS NOT NULL AND s.reps IS NOT NULL";

const BEST_STREAK_KEY: &str = "best_streak";
const WEEKLY_CHECKPOINT_KEY: &str = "weekly_volume_checkpoint";

fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {millis}").into(),
        )
    })
}

fn parse_date(s: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| StoreError::InvalidData(format!("date {s:?}: {e}")))
}

/// Maps `s.*` columns selected by [`SET_COLUMNS`]
fn set_from_row(row: &Row) -> rusqlite::Result<SetRecord> {
    Ok(SetRecord {
        id: Some(row.get(0)?),
        exercise_id: row.get(1)?,
        workout_id: row.get(2)?,
        weight: row.get(3)?,
        reps: row.get(4)?,
        rpe: row.get(5)?,
        is_warmup: row.get(6)?,
        is_complete: row.get(7)?,
        timestamp: from_millis(row.get(8)?)?,
    })
}

const SET_COLUMNS: &str = "s.id, s.exercise_id, s.workout_id, s.weight, s.reps, s.rpe, s.is_warmup, s.is_complete, s.timestamp";

/// Database wrapper
pub struct Database {
    conn: Connection,
    calendar: Calendar,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str, calendar: Calendar) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self { conn, calendar };
        db.init_schema()?;
        info!(path, "Database opened");
        Ok(db)
    }

    pub fn open_in_memory(calendar: Calendar) -> Result<Self, StoreError> {
        let db = Self { conn: Connection::open_in_memory()?, calendar };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema and seed the exercise catalog
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                target_muscle TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                started_at INTEGER NOT NULL,
                finished_at INTEGER
            );
            CREATE TABLE IF NOT EXISTS sets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id INTEGER NOT NULL REFERENCES workouts(id),
                exercise_id INTEGER NOT NULL REFERENCES exercises(id),
                weight REAL,
                reps INTEGER,
                rpe REAL,
                is_warmup INTEGER NOT NULL DEFAULT 0,
                is_complete INTEGER NOT NULL DEFAULT 1,
                timestamp INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sets_timestamp ON sets(timestamp);
            CREATE INDEX IF NOT EXISTS idx_sets_exercise ON sets(exercise_id);
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;

        for exercise in get_all_exercises() {
            self.conn.execute(
                "INSERT OR IGNORE INTO exercises (name, target_muscle) VALUES (?1, ?2)",
                params![exercise.name, exercise.target.name()],
            )?;
        }

        Ok(())
    }

    /// Add custom exercise, returns its id
    pub fn add_exercise(&self, name: &str, target_muscle: &str) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO exercises (name, target_muscle) VALUES (?1, ?2)",
            params![name, target_muscle.to_lowercase()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_exercises(&self) -> Result<Vec<ExerciseRow>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT id, name, target_muscle FROM exercises ORDER BY name")?;
        let rows = stmt
            .query_map([], |row| Ok(ExerciseRow { id: row.get(0)?, name: row.get(1)?, target_muscle: row.get(2)? }))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find_exercise(&self, name: &str) -> Result<Option<ExerciseRow>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, target_muscle FROM exercises WHERE name = ?1",
                params![name.trim()],
                |row| Ok(ExerciseRow { id: row.get(0)?, name: row.get(1)?, target_muscle: row.get(2)? }),
            )
            .optional()?;
        Ok(row)
    }

    pub fn start_workout(&self, started_at: DateTime<Utc>) -> Result<i64, StoreError> {
        self.conn.execute("INSERT INTO workouts (started_at) VALUES (?1)", params![to_millis(started_at)])?;
        let id = self.conn.last_insert_rowid();
        debug!(workout_id = id, "Workout started");
        Ok(id)
    }

    pub fn finish_workout(&self, workout_id: i64, finished_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE workouts SET finished_at = ?1 WHERE id = ?2",
            params![to_millis(finished_at), workout_id],
        )?;
        Ok(())
    }

    /// Most recent workout that has not been finished
    pub fn open_workout(&self) -> Result<Option<i64>, StoreError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM workouts WHERE finished_at IS NULL ORDER BY started_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Add new set record
    pub fn add_set(&self, set: &SetRecord) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO sets (workout_id, exercise_id, weight, reps, rpe, is_warmup, is_complete, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                set.workout_id,
                set.exercise_id,
                set.weight,
                set.reps,
                set.rpe,
                set.is_warmup,
                set.is_complete,
                to_millis(set.timestamp),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_preference(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM preferences WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set_preference(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn load_weekly_checkpoint(&self) -> Result<Option<TrackerCheckpoint>, StoreError> {
        match self.get_preference(WEEKLY_CHECKPOINT_KEY)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StoreError::InvalidData(format!("weekly checkpoint: {e}"))),
            None => Ok(None),
        }
    }

    pub fn save_weekly_checkpoint(&self, checkpoint: &TrackerCheckpoint) -> Result<(), StoreError> {
        let json = serde_json::to_string(checkpoint)
            .map_err(|e| StoreError::InvalidData(format!("weekly checkpoint: {e}")))?;
        self.set_preference(WEEKLY_CHECKPOINT_KEY, &json)
    }
}

impl WorkoutStore for Database {
    fn sum_volume_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64, StoreError> {
        let sql = format!(
            "SELECT COALESCE(SUM(s.weight * s.reps), 0.0) FROM sets s
             WHERE {WORKING} AND s.timestamp >= ?1 AND s.timestamp < ?2"
        );
        Ok(self.conn.query_row(&sql, params![to_millis(start), to_millis(end)], |row| row.get(0))?)
    }

    fn sum_volume_for_workout(&self, workout_id: i64) -> Result<f64, StoreError> {
        let sql = format!("SELECT COALESCE(SUM(s.weight * s.reps), 0.0) FROM sets s WHERE {WORKING} AND s.workout_id = ?1");
        Ok(self.conn.query_row(&sql, params![workout_id], |row| row.get(0))?)
    }

    fn daily_volume_history(&self) -> Result<Vec<DailyVolumePoint>, StoreError> {
        let sql = format!(
            "SELECT date(s.timestamp / 1000 + ?1, 'unixepoch') AS day, SUM(s.weight * s.reps)
             FROM sets s WHERE {WORKING} GROUP BY day ORDER BY day"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![self.calendar.offset_secs()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(day, volume)| Ok(DailyVolumePoint { date: parse_date(&day)?, volume }))
            .collect()
    }

    fn last_trained_per_muscle(&self) -> Result<Vec<MuscleLastTrained>, StoreError> {
        let sql = format!(
            "SELECT e.target_muscle, MAX(s.timestamp) FROM sets s
             JOIN exercises e ON e.id = s.exercise_id
             WHERE {WORKING} GROUP BY e.target_muscle"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MuscleLastTrained { muscle: row.get(0)?, last_trained: from_millis(row.get(1)?)? })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn working_sets_for_exercise(&self, exercise_id: i64) -> Result<Vec<SetRecord>, StoreError> {
        let sql = format!(
            "SELECT {SET_COLUMNS} FROM sets s WHERE {WORKING} AND s.exercise_id = ?1 ORDER BY s.timestamp"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let sets = stmt.query_map(params![exercise_id], set_from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(sets)
    }

    fn sets_in_range(
        &self,
        exercise_id: Option<i64>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TrendSet>, StoreError> {
        let sql = format!(
            "SELECT {SET_COLUMNS}, e.name, e.target_muscle FROM sets s
             JOIN exercises e ON e.id = s.exercise_id
             WHERE {WORKING} AND s.timestamp >= ?1 AND s.timestamp < ?2
               AND (?3 IS NULL OR s.exercise_id = ?3)
             ORDER BY s.timestamp"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let sets = stmt
            .query_map(params![to_millis(start), to_millis(end), exercise_id], |row| {
                Ok(TrendSet { set: set_from_row(row)?, exercise_name: row.get(9)?, target_muscle: row.get(10)? })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sets)
    }

    fn personal_bests_with_timestamps(&self, exercise_id: i64) -> Result<BTreeMap<u32, PersonalBestEntry>, StoreError> {
        let sql = format!(
            "SELECT s.reps, s.weight, MIN(s.timestamp) FROM sets s
             JOIN (
                 SELECT s.reps AS reps, MAX(s.weight) AS best FROM sets s
                 WHERE {WORKING} AND s.exercise_id = ?1 GROUP BY s.reps
             ) b ON b.reps = s.reps AND b.best = s.weight
             WHERE {WORKING} AND s.exercise_id = ?1
             GROUP BY s.reps"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![exercise_id], |row| {
                Ok(PersonalBestEntry {
                    reps: row.get(0)?,
                    max_weight: row.get(1)?,
                    first_achieved: from_millis(row.get(2)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries.into_iter().map(|e| (e.reps, e)).collect())
    }

    fn workout_dates_with_working_sets(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let sql = format!(
            "SELECT DISTINCT date(s.timestamp / 1000 + ?1, 'unixepoch') AS day FROM sets s
             WHERE {WORKING} ORDER BY day"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let days = stmt
            .query_map(params![self.calendar.offset_secs()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        days.iter().map(|d| parse_date(d)).collect()
    }

    fn year_to_date_workout_count(&self, year_start: DateTime<Utc>) -> Result<u32, StoreError> {
        let sql = format!("SELECT COUNT(DISTINCT s.workout_id) FROM sets s WHERE {WORKING} AND s.timestamp >= ?1");
        Ok(self.conn.query_row(&sql, params![to_millis(year_start)], |row| row.get(0))?)
    }

    fn best_streak(&self) -> Result<u32, StoreError> {
        match self.get_preference(BEST_STREAK_KEY)? {
            Some(value) => value
                .parse()
                .map_err(|e| StoreError::InvalidData(format!("best streak {value:?}: {e}"))),
            None => Ok(0),
        }
    }

    fn update_best_streak_if_needed(&self, candidate: u32) -> Result<bool, StoreError> {
        if candidate <= self.best_streak()? {
            return Ok(false);
        }
        self.set_preference(BEST_STREAK_KEY, &candidate.to_string())?;
        info!(best_streak = candidate, "New best streak");
        Ok(true)
    }
}
