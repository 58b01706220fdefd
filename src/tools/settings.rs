/// Tool for viewing and changing user settings
///
/// This module implements the settings_update MCP tool. Calling it without
/// arguments just reports the current settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_weekday, AppSettings, HabitSort, SortOrder};
use crate::lifecycle::Lifecycle;
use crate::progress::Clock;
use crate::reminders::JobScheduler;
use crate::storage::HabitStorage;
use crate::ServerError;

/// Parameters for updating settings; omitted fields keep their value
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UpdateSettingsParams {
    /// Checks that count as a 100% score (7-100)
    pub completed_count: Option<u32>,
    /// Day weekly periods start on, e.g. "sunday"
    pub first_day_of_week: Option<String>,
    pub hide_completed: Option<bool>,
    pub hide_archived: Option<bool>,
    /// name, points, score, streak, status or date_created
    pub sort: Option<String>,
    /// ascending or descending
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateSettingsResponse {
    pub success: bool,
    pub settings: AppSettings,
    /// Habits whose stats were recomputed because scoring inputs changed
    pub recomputed: usize,
    pub message: String,
}

pub fn update_settings<S, J, C>(
    lifecycle: &Lifecycle<'_, S, J, C>,
    params: UpdateSettingsParams,
) -> Result<UpdateSettingsResponse, ServerError>
where
    S: HabitStorage + ?Sized,
    J: JobScheduler + ?Sized,
    C: Clock,
{
    let current = lifecycle.storage.get_settings()?;
    let mut settings = current.clone();

    if let Some(count) = params.completed_count {
        settings.completed_count = count;
    }
    if let Some(day) = params.first_day_of_week.as_deref() {
        settings.first_day_of_week = parse_weekday(day)?;
    }
    if let Some(hide) = params.hide_completed {
        settings.hide_completed = hide;
    }
    if let Some(hide) = params.hide_archived {
        settings.hide_archived = hide;
    }
    if let Some(sort) = params.sort.as_deref() {
        settings.sort = HabitSort::parse(sort)?;
    }
    if let Some(order) = params.sort_order.as_deref() {
        settings.sort_order = SortOrder::parse(order)?;
    }

    settings.validate()?;

    let mut recomputed = 0;
    if settings != current {
        lifecycle.storage.update_settings(&settings)?;

        // Score and weekly periods depend on these two
        if settings.completed_count != current.completed_count
            || settings.first_day_of_week != current.first_day_of_week
        {
            recomputed = lifecycle.recompute_all()?;
        }
    }

    let message = format!(
        "⚙️ Settings\n- Completed count: {}\n- First day of week: {}\n- Hide completed: {}\n- Hide archived: {}\n- Sort: {} {}{}",
        settings.completed_count,
        settings.first_day_of_week,
        settings.hide_completed,
        settings.hide_archived,
        settings.sort.as_str(),
        settings.sort_order.as_str(),
        if recomputed > 0 {
            format!("\n\nRecomputed stats for {} habit(s).", recomputed)
        } else {
            String::new()
        }
    );

    Ok(UpdateSettingsResponse {
        success: true,
        settings,
        recomputed,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, Habit};
    use crate::tools::test_support::Fixture;
    use chrono::Weekday;

    #[test]
    fn test_no_arguments_reports_defaults() {
        let fixture = Fixture::new();
        let response = update_settings(&fixture.lifecycle(), UpdateSettingsParams::default()).unwrap();

        assert_eq!(response.settings, AppSettings::default());
        assert_eq!(response.recomputed, 0);
    }

    #[test]
    fn test_completed_count_change_rescores() {
        let fixture = Fixture::new();
        let habit = Habit::new("Walk".to_string(), Frequency::Daily, 1, None).unwrap();
        let (habit, _) = fixture.lifecycle().create_habit(habit, vec![]).unwrap();
        fixture.lifecycle().check_habit(&habit.id, None).unwrap();
        assert_eq!(fixture.storage.get_habit(&habit.id).unwrap().stats.score, 1);

        let response = update_settings(
            &fixture.lifecycle(),
            UpdateSettingsParams {
                completed_count: Some(10),
                first_day_of_week: Some("monday".to_string()),
                ..UpdateSettingsParams::default()
            },
        )
        .unwrap();

        assert_eq!(response.recomputed, 1);
        assert_eq!(fixture.storage.get_settings().unwrap().first_day_of_week, Weekday::Mon);
        assert_eq!(fixture.storage.get_habit(&habit.id).unwrap().stats.score, 10);
    }

    #[test]
    fn test_out_of_range_count_rejected() {
        let fixture = Fixture::new();
        let result = update_settings(
            &fixture.lifecycle(),
            UpdateSettingsParams { completed_count: Some(0), ..UpdateSettingsParams::default() },
        );

        assert!(result.is_err());
        assert_eq!(fixture.storage.get_settings().unwrap(), AppSettings::default());
    }
}
