/// Next-fire resolution for weekly reminders
///
/// A reminder names a weekday and a local time. Given "now" and whether
/// today should be skipped, this finds the next concrete instant and the
/// delay until it.

use chrono::{DateTime, LocalResult, NaiveDate, TimeZone};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{HabitId, ReminderSpec};
use crate::progress::calendar::{next, next_or_same, to_date};
use crate::reminders::ReminderError;

/// Data handed to the notification when a reminder fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderPayload {
    pub habit_id: HabitId,
    pub habit_title: String,
}

/// A one-shot job for the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub delay: std::time::Duration,
    pub payload: ReminderPayload,
    /// Jobs are cancelled in bulk by tag
    pub tag: HabitId,
}

/// Date the reminder should fire on next
pub fn next_fire_date(reminder: &ReminderSpec, today: NaiveDate, skip_today: bool) -> NaiveDate {
    if skip_today {
        next(today, reminder.day)
    } else {
        next_or_same(today, reminder.day)
    }
}

/// Delay from `now` until the reminder's next occurrence.
///
/// Returns `Ok(None)` when that occurrence is not in the future, e.g. a
/// reminder for 08:00 today resolved at 10:00. Those are dropped until the
/// next resolution pass.
pub fn resolve_next_fire<Tz: TimeZone>(
    reminder: &ReminderSpec,
    now: &DateTime<Tz>,
    skip_today: bool,
) -> Result<Option<std::time::Duration>, ReminderError> {
    let date = next_fire_date(reminder, to_date(now), skip_today);
    let local = date.and_time(reminder.time);

    let target = match now.timezone().from_local_datetime(&local) {
        LocalResult::Single(instant) => instant,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            return Err(ReminderError::NonexistentLocalTime { local });
        }
    };

    let delay = target.signed_duration_since(now.clone());
    if delay <= chrono::Duration::zero() {
        return Ok(None);
    }

    delay
        .to_std()
        .map(Some)
        .map_err(|_| ReminderError::OutOfRange { local })
}

/// Build the schedule requests for all of a habit's reminders.
///
/// Reminders that cannot be resolved are logged and skipped; the rest are
/// still scheduled.
pub fn plan_reminders<Tz: TimeZone>(
    habit_id: &HabitId,
    habit_title: &str,
    reminders: &[ReminderSpec],
    now: &DateTime<Tz>,
    skip_today: bool,
) -> Vec<ScheduleRequest> {
    let mut requests = Vec::with_capacity(reminders.len());

    for reminder in reminders {
        match resolve_next_fire(reminder, now, skip_today) {
            Ok(Some(delay)) => {
                debug!(
                    "Reminder for habit {} on {:?} at {} fires in {}s",
                    habit_id, reminder.day, reminder.time, delay.as_secs()
                );
                requests.push(ScheduleRequest {
                    delay,
                    payload: ReminderPayload {
                        habit_id: habit_id.clone(),
                        habit_title: habit_title.to_string(),
                    },
                    tag: habit_id.clone(),
                });
            }
            Ok(None) => {
                debug!(
                    "Reminder for habit {} on {:?} at {} already passed, not scheduled",
                    habit_id, reminder.day, reminder.time
                );
            }
            Err(e) => {
                warn!("Skipping reminder for habit {}: {}", habit_id, e);
            }
        }
    }

    requests
}
