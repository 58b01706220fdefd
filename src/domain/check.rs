/// Check records for habit completions
///
/// A check marks a habit as done on one calendar day. There is at most one
/// check per habit and day; checking the same day again removes it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::domain::HabitId;

/// A record of completing a habit on a specific day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Which habit this check is for
    pub habit_id: HabitId,
    /// Which day the habit was done
    pub check_date: NaiveDate,
}

impl CheckRecord {
    pub fn new(habit_id: HabitId, check_date: NaiveDate) -> Self {
        Self { habit_id, check_date }
    }
}

/// Outcome of toggling a check for a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckToggle {
    /// No check existed, one was inserted
    Completed,
    /// A check existed and was removed
    Uncompleted,
}

/// Extract the check dates in the order given
pub fn check_dates(checks: &[CheckRecord]) -> Vec<NaiveDate> {
    checks.iter().map(|c| c.check_date).collect()
}
