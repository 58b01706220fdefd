/// User settings that feed the progress engine and the habit list
///
/// The completion target is validated here so the scoring code never sees
/// a zero divisor.

use std::num::NonZeroU32;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use crate::domain::{DomainError, HabitSort, SortOrder};

pub const DEFAULT_COMPLETED_COUNT: u32 = 66;
pub const MIN_COMPLETED_COUNT: u32 = 7;
pub const MAX_COMPLETED_COUNT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Lifetime checks that count as a 100% score
    pub completed_count: u32,
    /// Day weekly periods start on
    pub first_day_of_week: Weekday,
    /// Hide habits whose latest streak already covers today
    pub hide_completed: bool,
    pub hide_archived: bool,
    pub sort: HabitSort,
    pub sort_order: SortOrder,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            completed_count: DEFAULT_COMPLETED_COUNT,
            first_day_of_week: Weekday::Sun,
            hide_completed: false,
            hide_archived: false,
            sort: HabitSort::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl AppSettings {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_completed_count(self.completed_count).map(|_| ())
    }

    /// Completion target for the scoring engine
    pub fn completion_target(&self) -> Result<NonZeroU32, DomainError> {
        validate_completed_count(self.completed_count)
    }
}

/// Check a completion target against the allowed range
pub fn validate_completed_count(count: u32) -> Result<NonZeroU32, DomainError> {
    if !(MIN_COMPLETED_COUNT..=MAX_COMPLETED_COUNT).contains(&count) {
        return Err(DomainError::InvalidSetting(format!(
            "Completed count must be between {} and {}, got {}",
            MIN_COMPLETED_COUNT, MAX_COMPLETED_COUNT, count
        )));
    }
    NonZeroU32::new(count).ok_or_else(|| {
        DomainError::InvalidSetting("Completed count cannot be zero".to_string())
    })
}
