/// Reminder specifications
///
/// A reminder fires on a given day of the week at a given local time. A habit
/// can have many; they are always replaced as a whole when edited.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use crate::domain::{HabitId, DomainError, parse_weekday};

/// One weekly reminder slot for a habit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSpec {
    pub habit_id: HabitId,
    pub day: Weekday,
    pub time: NaiveTime,
}

impl ReminderSpec {
    pub fn new(habit_id: HabitId, day: Weekday, time: NaiveTime) -> Self {
        Self { habit_id, day, time }
    }

    /// Parse a reminder from user input such as ("monday", "20:00")
    pub fn parse(habit_id: HabitId, day: &str, time: &str) -> Result<Self, DomainError> {
        let day = parse_weekday(day)?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
            .map_err(|_| DomainError::InvalidReminder(
                format!("Invalid time '{}', expected HH:MM", time)
            ))?;
        Ok(Self::new(habit_id, day, time))
    }
}

/// Drop duplicate (day, time) pairs, keeping the first occurrence
pub fn dedup_reminders(reminders: Vec<ReminderSpec>) -> Vec<ReminderSpec> {
    let mut unique: Vec<ReminderSpec> = Vec::with_capacity(reminders.len());
    for reminder in reminders {
        if !unique.iter().any(|r| r.day == reminder.day && r.time == reminder.time) {
            unique.push(reminder);
        }
    }
    unique
}
