/// Tool for updating existing habits
///
/// This module implements the habit_update MCP tool to modify a habit's
/// name, frequency, quota, notes, archive flag, reminders or encouragements.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Encouragement, Frequency};
use crate::lifecycle::Lifecycle;
use crate::progress::Clock;
use crate::reminders::JobScheduler;
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, parse_reminders, ReminderParam};
use crate::ServerError;

/// Parameters for updating an existing habit
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    pub name: Option<String>,
    /// daily, weekly, monthly or yearly
    pub frequency: Option<String>,
    pub times_per_frequency: Option<u32>,
    /// New notes; an empty string clears them
    pub notes: Option<String>,
    pub archived: Option<bool>,
    /// Replaces all reminders when given; an empty list removes them
    pub reminders: Option<Vec<ReminderParam>>,
    /// Replaces all encouragements when given; an empty list restores the defaults
    pub encouragements: Option<Vec<String>>,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Apply the edit, then recompute stats and reschedule reminders
pub fn update_habit<S, J, C>(
    lifecycle: &Lifecycle<'_, S, J, C>,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, ServerError>
where
    S: HabitStorage + ?Sized,
    J: JobScheduler + ?Sized,
    C: Clock,
{
    let habit_id = parse_habit_id(&params.habit_id)?;
    let mut habit = lifecycle.storage.get_habit(&habit_id)?;

    let frequency = params.frequency.as_deref().map(Frequency::parse).transpose()?;
    let notes = params
        .notes
        .map(|text| if text.trim().is_empty() { None } else { Some(text) });
    let reminders = params
        .reminders
        .as_deref()
        .map(|list| parse_reminders(&habit_id, list))
        .transpose()?;
    if let Some(contents) = &params.encouragements {
        Encouragement::parse_all(&habit_id, contents)?;
    }

    habit.update(params.name, frequency, params.times_per_frequency, notes, params.archived)?;

    let (habit, scheduled) = lifecycle.save_habit(&habit, reminders)?;
    if let Some(contents) = &params.encouragements {
        lifecycle.save_encouragements(&habit.id, contents)?;
    }

    let message = match params.archived {
        Some(true) => format!("🗄️ Archived habit '{}'", habit.name),
        Some(false) => format!("▶️ Restored habit '{}' ({} reminder(s) scheduled)", habit.name, scheduled),
        None => format!(
            "✅ Updated habit '{}' ({}). Streak: {} | Points: {} | Score: {}%",
            habit.name,
            habit.frequency_display(),
            habit.stats.streak,
            habit.stats.points,
            habit.stats.score
        ),
    };

    Ok(UpdateHabitResponse {
        success: true,
        message,
    })
}
