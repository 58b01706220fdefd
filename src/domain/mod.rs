/// Domain module containing core business entities and data types
///
/// This module defines the core entities (Habit, CheckRecord, ReminderSpec,
/// Encouragement, AppSettings) and their validation rules. The streak and scoring math lives
/// in `progress`; these types only carry data and enforce input constraints.

pub mod habit;
pub mod check;
pub mod encouragement;
pub mod reminder;
pub mod settings;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use check::*;
pub use encouragement::*;
pub use reminder::*;
pub use settings::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid reminder: {0}")]
    InvalidReminder(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}
