/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.

use std::path::PathBuf;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{
    AppSettings, CheckRecord, CheckToggle, Encouragement, Frequency, Habit, HabitId, HabitSort,
    HabitStats, ReminderSpec, SortOrder,
};
use crate::storage::{StorageError, HabitStorage, migrations};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

const HABIT_COLUMNS: &str = "id, name, frequency, times_per_frequency, notes, archived, created_at,
    points, score, streak, last_streak_end, last_completed, completed";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Storage on a private in-memory database
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        // Checks and reminders rely on ON DELETE CASCADE
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    /// Map a `habits` row selected with `HABIT_COLUMNS`
    fn row_to_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let id_str: String = row.get(0)?;
        let id = HabitId::from_string(&id_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
        })?;

        let frequency_str: String = row.get(2)?;
        let frequency = Frequency::parse(&frequency_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(2, "Invalid frequency".to_string(), rusqlite::types::Type::Text)
        })?;

        let created_at_str: String = row.get(6)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(6, "Invalid datetime".to_string(), rusqlite::types::Type::Text)
            })?
            .with_timezone(&Utc);

        let stats = HabitStats {
            points: Self::get_u64(row, 7)?,
            score: Self::get_u32(row, 8)?,
            streak: Self::get_u64(row, 9)?,
            last_streak_end: Self::get_optional_date(row, 10)?,
            last_completed: Self::get_optional_date(row, 11)?,
            completed: Self::get_u32(row, 12)?,
        };

        Ok(Habit::from_existing(
            id,
            row.get(1)?, // name
            frequency,
            Self::get_u32(row, 3)?,
            row.get(4)?, // notes
            row.get(5)?, // archived
            created_at,
            stats,
        ))
    }

    fn get_u64(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
        let value: i64 = row.get(idx)?;
        u64::try_from(value).map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, "Negative count".to_string(), rusqlite::types::Type::Integer)
        })
    }

    fn get_u32(row: &Row<'_>, idx: usize) -> rusqlite::Result<u32> {
        let value: i64 = row.get(idx)?;
        u32::try_from(value).map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, "Count out of range".to_string(), rusqlite::types::Type::Integer)
        })
    }

    fn get_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
        let text: String = row.get(idx)?;
        NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, "Invalid date".to_string(), rusqlite::types::Type::Text)
        })
    }

    fn get_optional_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
        let text: Option<String> = row.get(idx)?;
        text.map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|_| {
                rusqlite::Error::InvalidColumnType(idx, "Invalid date".to_string(), rusqlite::types::Type::Text)
            })
        })
        .transpose()
    }

    fn get_weekday(row: &Row<'_>, idx: usize) -> rusqlite::Result<Weekday> {
        let text: String = row.get(idx)?;
        text.parse::<Weekday>().map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, "Invalid weekday".to_string(), rusqlite::types::Type::Text)
        })
    }

    fn format_date(date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Turn a unique-name violation into a domain-level error
    fn map_name_conflict(err: rusqlite::Error, name: &str) -> StorageError {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::DuplicateName { name: name.to_string() }
            }
            other => StorageError::Query(other),
        }
    }

    fn ensure_habit_exists(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM habits WHERE id = ?1)",
            params![habit_id.to_string()],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(StorageError::HabitNotFound { habit_id: habit_id.to_string() })
        }
    }
}

impl HabitStorage for SqliteStorage {
    /// Create a new habit in the database
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO habits (
                    id, name, frequency, times_per_frequency, notes, archived, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    habit.id.to_string(),
                    habit.name,
                    habit.frequency.as_str(),
                    habit.times_per_frequency,
                    habit.notes,
                    habit.archived,
                    habit.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| Self::map_name_conflict(e, &habit.name))?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    /// Get a habit by its ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;

        let result = stmt
            .query_row(params![habit_id.to_string()], Self::row_to_habit)
            .optional()?;

        result.ok_or_else(|| StorageError::HabitNotFound {
            habit_id: habit_id.to_string(),
        })
    }

    /// Update an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE habits SET
                    name = ?2,
                    frequency = ?3,
                    times_per_frequency = ?4,
                    notes = ?5,
                    archived = ?6
                 WHERE id = ?1",
                params![
                    habit.id.to_string(),
                    habit.name,
                    habit.frequency.as_str(),
                    habit.times_per_frequency,
                    habit.notes,
                    habit.archived,
                ],
            )
            .map_err(|e| Self::map_name_conflict(e, &habit.name))?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    /// Overwrite all stats columns at once so readers never see a mix
    fn update_stats(&self, habit_id: &HabitId, stats: &HabitStats) -> Result<(), StorageError> {
        let points = i64::try_from(stats.points)
            .map_err(|_| StorageError::CorruptRow { table: "habits", message: "points overflow".to_string() })?;
        let streak = i64::try_from(stats.streak)
            .map_err(|_| StorageError::CorruptRow { table: "habits", message: "streak overflow".to_string() })?;

        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                points = ?2,
                score = ?3,
                streak = ?4,
                last_streak_end = ?5,
                last_completed = ?6,
                completed = ?7
             WHERE id = ?1",
            params![
                habit_id.to_string(),
                points,
                stats.score,
                streak,
                stats.last_streak_end.map(Self::format_date),
                stats.last_completed.map(Self::format_date),
                stats.completed,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!(
            "Updated stats for habit {}: {} points, score {}, streak {}",
            habit_id, stats.points, stats.score, stats.streak
        );
        Ok(())
    }

    /// Hard delete; checks and reminders go with it
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    /// List habits in creation order
    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>, StorageError> {
        let mut sql = format!("SELECT {} FROM habits", HABIT_COLUMNS);

        if !include_archived {
            sql.push_str(" WHERE archived = 0");
        }

        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let habit_iter = stmt.query_map([], Self::row_to_habit)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    fn list_checks(&self, habit_id: &HabitId) -> Result<Vec<CheckRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT check_date FROM habit_checks WHERE habit_id = ?1 ORDER BY check_date ASC",
        )?;

        let check_iter = stmt.query_map(params![habit_id.to_string()], |row| {
            Ok(CheckRecord::new(habit_id.clone(), Self::get_date(row, 0)?))
        })?;

        let mut checks = Vec::new();
        for check in check_iter {
            checks.push(check?);
        }

        Ok(checks)
    }

    fn has_check(&self, habit_id: &HabitId, date: NaiveDate) -> Result<bool, StorageError> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM habit_checks WHERE habit_id = ?1 AND check_date = ?2)",
            params![habit_id.to_string(), Self::format_date(date)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Delete the day's check if present, insert it otherwise
    fn toggle_check(&self, habit_id: &HabitId, date: NaiveDate) -> Result<CheckToggle, StorageError> {
        self.ensure_habit_exists(habit_id)?;

        let tx = self.conn.unchecked_transaction()?;
        let id = habit_id.to_string();
        let day = Self::format_date(date);

        let removed = tx.execute(
            "DELETE FROM habit_checks WHERE habit_id = ?1 AND check_date = ?2",
            params![id, day],
        )?;

        let outcome = if removed > 0 {
            CheckToggle::Uncompleted
        } else {
            tx.execute(
                "INSERT INTO habit_checks (habit_id, check_date) VALUES (?1, ?2)",
                params![id, day],
            )?;
            CheckToggle::Completed
        };

        tx.commit()?;

        tracing::debug!("Toggled check for habit {} on {}: {:?}", habit_id, day, outcome);
        Ok(outcome)
    }

    fn list_reminders(&self, habit_id: &HabitId) -> Result<Vec<ReminderSpec>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT day, time FROM habit_reminders WHERE habit_id = ?1 ORDER BY rowid ASC",
        )?;

        let reminder_iter = stmt.query_map(params![habit_id.to_string()], |row| {
            let day = Self::get_weekday(row, 0)?;
            let time_str: String = row.get(1)?;
            let time = NaiveTime::parse_from_str(&time_str, TIME_FORMAT).map_err(|_| {
                rusqlite::Error::InvalidColumnType(1, "Invalid time".to_string(), rusqlite::types::Type::Text)
            })?;
            Ok(ReminderSpec::new(habit_id.clone(), day, time))
        })?;

        let mut reminders = Vec::new();
        for reminder in reminder_iter {
            reminders.push(reminder?);
        }

        Ok(reminders)
    }

    /// Delete-all-then-reinsert, in one transaction
    fn replace_reminders(&self, habit_id: &HabitId, reminders: &[ReminderSpec]) -> Result<(), StorageError> {
        self.ensure_habit_exists(habit_id)?;

        let tx = self.conn.unchecked_transaction()?;
        let id = habit_id.to_string();

        tx.execute("DELETE FROM habit_reminders WHERE habit_id = ?1", params![id])?;
        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO habit_reminders (habit_id, day, time) VALUES (?1, ?2, ?3)",
            )?;
            for reminder in reminders {
                insert.execute(params![
                    id,
                    reminder.day.to_string(),
                    reminder.time.format(TIME_FORMAT).to_string(),
                ])?;
            }
        }

        tx.commit()?;

        tracing::debug!("Replaced reminders for habit {}: {} slot(s)", habit_id, reminders.len());
        Ok(())
    }

    fn list_encouragements(&self, habit_id: &HabitId) -> Result<Vec<Encouragement>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT content FROM habit_encouragements WHERE habit_id = ?1 ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map(params![habit_id.to_string()], |row| {
            Ok(Encouragement {
                habit_id: habit_id.clone(),
                content: row.get(0)?,
            })
        })?;

        let mut encouragements = Vec::new();
        for encouragement in rows {
            encouragements.push(encouragement?);
        }
        Ok(encouragements)
    }

    fn replace_encouragements(
        &self,
        habit_id: &HabitId,
        encouragements: &[Encouragement],
    ) -> Result<(), StorageError> {
        self.ensure_habit_exists(habit_id)?;

        let tx = self.conn.unchecked_transaction()?;
        let id = habit_id.to_string();

        tx.execute("DELETE FROM habit_encouragements WHERE habit_id = ?1", params![id])?;
        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO habit_encouragements (habit_id, content) VALUES (?1, ?2)",
            )?;
            for encouragement in encouragements {
                insert.execute(params![id, encouragement.content])?;
            }
        }

        tx.commit()?;

        tracing::debug!("Replaced encouragements for habit {}: {}", habit_id, encouragements.len());
        Ok(())
    }

    fn get_settings(&self) -> Result<AppSettings, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT completed_count, first_day_of_week, hide_completed, hide_archived, sort, sort_order
                 FROM app_settings WHERE id = 1",
                [],
                |row| {
                    Ok((
                        Self::get_u32(row, 0)?,
                        Self::get_weekday(row, 1)?,
                        row.get::<_, bool>(2)?,
                        row.get::<_, bool>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((completed_count, first_day_of_week, hide_completed, hide_archived, sort, sort_order)) = row else {
            return Ok(AppSettings::default());
        };

        let settings = AppSettings {
            completed_count,
            first_day_of_week,
            hide_completed,
            hide_archived,
            sort: HabitSort::parse(&sort)?,
            sort_order: SortOrder::parse(&sort_order)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn update_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        settings.validate()?;

        self.conn.execute(
            "INSERT INTO app_settings (
                id, completed_count, first_day_of_week, hide_completed, hide_archived, sort, sort_order
             ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                completed_count = excluded.completed_count,
                first_day_of_week = excluded.first_day_of_week,
                hide_completed = excluded.hide_completed,
                hide_archived = excluded.hide_archived,
                sort = excluded.sort,
                sort_order = excluded.sort_order",
            params![
                settings.completed_count,
                settings.first_day_of_week.to_string(),
                settings.hide_completed,
                settings.hide_archived,
                settings.sort.as_str(),
                settings.sort_order.as_str(),
            ],
        )?;

        tracing::debug!("Updated settings: {:?}", settings);
        Ok(())
    }
}
