/// Tool for checking a habit's progress in detail
///
/// This module implements the habit_status MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{check_dates, HabitStats};
use crate::lifecycle::Lifecycle;
use crate::progress::{calculate_streaks, Clock};
use crate::reminders::JobScheduler;
use crate::storage::HabitStorage;
use crate::tools::{describe_reminders, parse_habit_id};
use crate::ServerError;

/// Parameters for checking habit status
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StatusParams {
    /// ID of the habit
    pub habit_id: String,
}

/// Response from checking habit status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub habit_id: String,
    pub name: String,
    pub stats: HabitStats,
    /// Longest streak ever, in periods
    pub best_streak: u64,
    pub reminders: Vec<String>,
    pub encouragements: Vec<String>,
    pub message: String,
}

/// Describe one habit's stats, streak history and reminders
pub fn get_habit_status<S, J, C>(
    lifecycle: &Lifecycle<'_, S, J, C>,
    params: StatusParams,
) -> Result<StatusResponse, ServerError>
where
    S: HabitStorage + ?Sized,
    J: JobScheduler + ?Sized,
    C: Clock,
{
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = lifecycle.storage.get_habit(&habit_id)?;
    let settings = lifecycle.storage.get_settings()?;
    let checks = lifecycle.storage.list_checks(&habit_id)?;
    let reminders = lifecycle.storage.list_reminders(&habit_id)?;
    let encouragements: Vec<String> = lifecycle
        .storage
        .list_encouragements(&habit_id)?
        .into_iter()
        .map(|e| e.content)
        .collect();
    let today = lifecycle.clock.today();

    let streaks = calculate_streaks(
        habit.frequency,
        habit.times_per_frequency,
        &check_dates(&checks),
        settings.first_day_of_week,
    );
    let best_streak = streaks
        .iter()
        .map(|s| s.duration(habit.frequency))
        .max()
        .unwrap_or(0);

    let stats = habit.stats.clone();
    let state = if stats.is_completed_today(today) {
        "✅ Done today"
    } else if stats.is_virtual_completed(today) {
        "☑️ Covered for this period"
    } else {
        "⬜ Not done yet"
    };

    let mut message = format!(
        "🎯 **{}** ({})\n   {}\n   🔥 Streak: {} {}(s) | 🏆 Best: {} | ⭐ Points: {} | 📊 Score: {}% | ✅ Checks: {}",
        habit.name,
        habit.frequency_display(),
        state,
        stats.streak,
        habit.frequency.unit(),
        best_streak,
        stats.points,
        stats.score,
        stats.completed,
    );
    if let Some(last) = stats.last_completed {
        message.push_str(&format!("\n   Last completed: {}", last));
    }
    if !reminders.is_empty() {
        message.push_str(&format!("\n   ⏰ Reminders: {}", describe_reminders(&reminders)));
    }
    if !encouragements.is_empty() {
        message.push_str(&format!("\n   💬 {}", encouragements.join(" / ")));
    }
    if let Some(notes) = &habit.notes {
        message.push_str(&format!("\n   📝 {}", notes));
    }

    Ok(StatusResponse {
        habit_id: habit.id.to_string(),
        name: habit.name,
        stats,
        best_streak,
        reminders: reminders
            .iter()
            .map(|r| format!("{} {}", r.day, r.time.format("%H:%M")))
            .collect(),
        encouragements,
        message,
    })
}
