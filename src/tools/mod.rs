/// MCP tools for habit management
///
/// This module contains all the MCP tools that external clients can call
/// to interact with the habit maker. Each tool takes a parameter struct
/// whose JSON schema is published through `tools/list`.

pub mod create;
pub mod check;
pub mod status;
pub mod list;
pub mod update;
pub mod delete;
pub mod settings;

// Re-export tool functions for easy access
pub use create::*;
pub use check::*;
pub use status::*;
pub use list::*;
pub use update::*;
pub use delete::*;
pub use settings::*;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::{HabitId, ReminderSpec, DomainError};
use crate::storage::StorageError;
use crate::ServerError;

/// A weekly reminder as given by the client
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReminderParam {
    /// Day of the week, e.g. "monday" or "mon"
    pub day: String,
    /// Local time as HH:MM
    pub time: String,
}

/// Parse a habit ID argument; malformed IDs are reported as not found
pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, ServerError> {
    if raw.trim().is_empty() {
        return Err(DomainError::Validation {
            message: "Habit ID cannot be empty".to_string(),
        }
        .into());
    }
    HabitId::from_string(raw)
        .map_err(|_| StorageError::HabitNotFound { habit_id: raw.to_string() }.into())
}

pub(crate) fn parse_reminders(habit_id: &HabitId, params: &[ReminderParam]) -> Result<Vec<ReminderSpec>, DomainError> {
    params
        .iter()
        .map(|p| ReminderSpec::parse(habit_id.clone(), &p.day, &p.time))
        .collect()
}

/// "Mon 08:00, Fri 20:30"
pub(crate) fn describe_reminders(reminders: &[ReminderSpec]) -> String {
    reminders
        .iter()
        .map(|r| format!("{} {}", r.day, r.time.format("%H:%M")))
        .collect::<Vec<_>>()
        .join(", ")
}
