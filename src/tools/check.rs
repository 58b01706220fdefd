/// Tool for checking off habits
///
/// This module implements the habit_check MCP tool. Checking a day that is
/// already checked removes the check again.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{CheckToggle, DomainError};
use crate::lifecycle::Lifecycle;
use crate::progress::Clock;
use crate::reminders::JobScheduler;
use crate::storage::HabitStorage;
use crate::tools::parse_habit_id;
use crate::ServerError;

/// Parameters for checking a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckHabitParams {
    /// ID of the habit to check
    pub habit_id: String,
    /// Day to toggle as YYYY-MM-DD (default: today)
    pub date: Option<String>,
}

/// Response from checking a habit
#[derive(Debug, Serialize)]
pub struct CheckHabitResponse {
    pub success: bool,
    pub toggle: CheckToggle,
    pub streak: u64,
    pub points: u64,
    pub score: u32,
    pub message: String,
}

/// Toggle a habit's check and report its refreshed progress
pub fn check_habit<S, J, C>(
    lifecycle: &Lifecycle<'_, S, J, C>,
    params: CheckHabitParams,
) -> Result<CheckHabitResponse, ServerError>
where
    S: HabitStorage + ?Sized,
    J: JobScheduler + ?Sized,
    C: Clock,
{
    let habit_id = parse_habit_id(&params.habit_id)?;

    let date = params
        .date
        .as_deref()
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| DomainError::InvalidDate(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
        })
        .transpose()?;

    let outcome = lifecycle.check_habit(&habit_id, date)?;
    let stats = &outcome.habit.stats;

    let message = match outcome.toggle {
        CheckToggle::Completed => {
            let mut message = format!("🔥 Checked '{}' for {}", outcome.habit.name, outcome.date);
            if let Some(congrats) = &outcome.congrats {
                message.push_str(&format!("\n{}", congrats));
            }
            message
        }
        CheckToggle::Uncompleted => format!("↩️ Unchecked '{}' for {}", outcome.habit.name, outcome.date),
    };

    Ok(CheckHabitResponse {
        success: true,
        toggle: outcome.toggle,
        streak: stats.streak,
        points: stats.points,
        score: stats.score,
        message: format!(
            "{}\nStreak: {} | Points: {} | Score: {}%",
            message, stats.streak, stats.points, stats.score
        ),
    })
}
