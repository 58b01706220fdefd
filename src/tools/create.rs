/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Encouragement, Frequency, Habit};
use crate::lifecycle::Lifecycle;
use crate::progress::Clock;
use crate::reminders::JobScheduler;
use crate::storage::HabitStorage;
use crate::tools::{parse_reminders, ReminderParam};
use crate::ServerError;

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit
    pub name: String,
    /// daily, weekly, monthly or yearly (default: daily)
    pub frequency: Option<String>,
    /// Checks needed per period (default: 1)
    pub times_per_frequency: Option<u32>,
    /// Optional notes
    pub notes: Option<String>,
    /// Weekly reminders
    #[serde(default)]
    pub reminders: Vec<ReminderParam>,
    /// Messages to pick from after a check-in (defaults are used when empty)
    #[serde(default)]
    pub encouragements: Vec<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit_id: Option<String>,
    pub message: String,
}

/// Create a new habit and schedule its reminders
pub fn create_habit<S, J, C>(
    lifecycle: &Lifecycle<'_, S, J, C>,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ServerError>
where
    S: HabitStorage + ?Sized,
    J: JobScheduler + ?Sized,
    C: Clock,
{
    let frequency = match params.frequency.as_deref() {
        Some(raw) => Frequency::parse(raw)?,
        None => Frequency::Daily,
    };

    let habit = Habit::new(
        params.name,
        frequency,
        params.times_per_frequency.unwrap_or(1),
        params.notes,
    )?;
    let reminders = parse_reminders(&habit.id, &params.reminders)?;
    Encouragement::parse_all(&habit.id, &params.encouragements)?;

    let (habit, scheduled) = lifecycle.create_habit(habit, reminders)?;
    if !params.encouragements.is_empty() {
        lifecycle.save_encouragements(&habit.id, &params.encouragements)?;
    }

    let reminder_note = if scheduled > 0 {
        format!(" {} reminder(s) scheduled.", scheduled)
    } else {
        String::new()
    };

    Ok(CreateHabitResponse {
        success: true,
        habit_id: Some(habit.id.to_string()),
        message: format!(
            "✅ Created habit '{}' ({})! Ready to start your streak!{}",
            habit.name,
            habit.frequency_display(),
            reminder_note
        ),
    })
}
