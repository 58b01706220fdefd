/// Tool for deleting habits
///
/// This module implements the habit_delete MCP tool. Deletion is permanent;
/// use habit_update with `archived` to keep the history.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lifecycle::Lifecycle;
use crate::progress::Clock;
use crate::reminders::JobScheduler;
use crate::storage::HabitStorage;
use crate::tools::parse_habit_id;
use crate::ServerError;

/// Parameters for deleting a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteHabitParams {
    /// ID of the habit to delete
    pub habit_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub message: String,
}

pub fn delete_habit<S, J, C>(
    lifecycle: &Lifecycle<'_, S, J, C>,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ServerError>
where
    S: HabitStorage + ?Sized,
    J: JobScheduler + ?Sized,
    C: Clock,
{
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = lifecycle.delete_habit(&habit_id)?;

    Ok(DeleteHabitResponse {
        success: true,
        message: format!(
            "🗑️ Deleted habit '{}' with {} check(s)",
            habit.name, habit.stats.completed
        ),
    })
}
