/// Tool for listing habits with their progress
///
/// This module implements the habit_list MCP tool. Filtering and ordering
/// follow the saved settings unless overridden for a single call.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{HabitSort, SortOrder};
use crate::lifecycle::Lifecycle;
use crate::progress::Clock;
use crate::reminders::JobScheduler;
use crate::storage::HabitStorage;
use crate::ServerError;

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// name, points, score, streak, status or date_created (default: saved setting)
    pub sort: Option<String>,
    /// ascending or descending (default: saved setting)
    pub sort_order: Option<String>,
    /// Hide habits already done for the current period
    pub hide_completed: Option<bool>,
    /// Hide archived habits
    pub hide_archived: Option<bool>,
}

/// Summary information for a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub habit_id: String,
    pub name: String,
    pub frequency: String,
    pub points: u64,
    pub score: u32,
    pub streak: u64,
    pub completed_today: bool,
    /// Today is covered by the latest streak
    pub virtual_completed: bool,
    pub archived: bool,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub message: String,
}

/// List habits using the saved settings plus any per-call overrides
pub fn list_habits<S, J, C>(
    lifecycle: &Lifecycle<'_, S, J, C>,
    params: ListHabitsParams,
) -> Result<ListHabitsResponse, ServerError>
where
    S: HabitStorage + ?Sized,
    J: JobScheduler + ?Sized,
    C: Clock,
{
    let mut settings = lifecycle.storage.get_settings()?;
    if let Some(sort) = params.sort.as_deref() {
        settings.sort = HabitSort::parse(sort)?;
    }
    if let Some(order) = params.sort_order.as_deref() {
        settings.sort_order = SortOrder::parse(order)?;
    }
    if let Some(hide) = params.hide_completed {
        settings.hide_completed = hide;
    }
    if let Some(hide) = params.hide_archived {
        settings.hide_archived = hide;
    }

    let today = lifecycle.clock.today();
    let habits = lifecycle.list_habits(&settings)?;

    let summaries: Vec<HabitSummary> = habits
        .iter()
        .map(|h| HabitSummary {
            habit_id: h.id.to_string(),
            name: h.name.clone(),
            frequency: h.frequency_display(),
            points: h.stats.points,
            score: h.stats.score,
            streak: h.stats.streak,
            completed_today: h.stats.is_completed_today(today),
            virtual_completed: h.stats.is_virtual_completed(today),
            archived: h.archived,
        })
        .collect();

    let message = if summaries.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let header = format!(
            "📋 **Habits** ({}, sorted by {} {})\n\n",
            summaries.len(),
            settings.sort.as_str(),
            settings.sort_order.as_str()
        );
        let lines = summaries
            .iter()
            .map(|h| {
                let status = if h.completed_today {
                    "✅"
                } else if h.virtual_completed {
                    "☑️"
                } else {
                    "⬜"
                };
                format!(
                    "{} **{}** ({})\n   📅 {} | 🔥 Streak: {} | ⭐ Points: {} | 📊 Score: {}%{}\n   ID: {}",
                    status,
                    h.name,
                    &h.habit_id[..8],
                    h.frequency,
                    h.streak,
                    h.points,
                    h.score,
                    if h.archived { " 🗄️ (archived)" } else { "" },
                    h.habit_id
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{}{}", header, lines)
    };

    Ok(ListHabitsResponse {
        habits: summaries,
        message,
    })
}
