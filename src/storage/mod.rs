/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a repository interface for habits, checks, reminders, encouragements
/// and settings.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;
use crate::domain::{
    AppSettings, CheckRecord, CheckToggle, DomainError, Encouragement, Habit, HabitId, HabitStats,
    ReminderSpec,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Invalid(#[from] DomainError),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Duplicate habit name: {name}")]
    DuplicateName { name: String },

    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for habits
///
/// This trait allows us to potentially swap out SQLite for other databases
/// in the future while keeping the same interface.
pub trait HabitStorage {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Update a habit's editable fields (not its stats)
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Write a freshly computed stats snapshot in one statement
    fn update_stats(&self, habit_id: &HabitId, stats: &HabitStats) -> Result<(), StorageError>;

    /// Delete a habit together with its checks and reminders
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List habits, oldest first
    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>, StorageError>;

    /// All checks for a habit, ascending by date
    fn list_checks(&self, habit_id: &HabitId) -> Result<Vec<CheckRecord>, StorageError>;

    /// Whether a check exists for the habit on `date`
    fn has_check(&self, habit_id: &HabitId, date: NaiveDate) -> Result<bool, StorageError>;

    /// Insert the check if missing, delete it if present
    fn toggle_check(&self, habit_id: &HabitId, date: NaiveDate) -> Result<CheckToggle, StorageError>;

    /// Reminder specs for a habit
    fn list_reminders(&self, habit_id: &HabitId) -> Result<Vec<ReminderSpec>, StorageError>;

    /// Delete all of a habit's reminders and insert `reminders` instead
    fn replace_reminders(&self, habit_id: &HabitId, reminders: &[ReminderSpec]) -> Result<(), StorageError>;

    /// Encouragements for a habit, in insertion order
    fn list_encouragements(&self, habit_id: &HabitId) -> Result<Vec<Encouragement>, StorageError>;

    /// Delete all of a habit's encouragements and insert `encouragements` instead
    fn replace_encouragements(
        &self,
        habit_id: &HabitId,
        encouragements: &[Encouragement],
    ) -> Result<(), StorageError>;

    /// Current settings, defaults when never saved
    fn get_settings(&self) -> Result<AppSettings, StorageError>;

    /// Persist validated settings
    fn update_settings(&self, settings: &AppSettings) -> Result<(), StorageError>;
}
