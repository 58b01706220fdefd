/// Points where stored data, the progress engine and reminders meet
///
/// Every mutation that can change a habit's progress goes through here:
/// checking a day, editing a habit or its reminders, deleting it, and the
/// reconciliation pass at startup. Each one recomputes stats from the full
/// check history and then replaces the habit's pending reminders.

use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info, warn};

use crate::domain::{
    check_dates, choose_encouragement, dedup_reminders, AppSettings, CheckToggle, DomainError,
    Encouragement, Habit, HabitId, HabitSort, HabitStats, ReminderSpec, SortOrder,
};
use crate::progress::calendar::to_date;
use crate::progress::{compute_stats, congrats_message, Clock, StatsContext};
use crate::reminders::{plan_reminders, JobScheduler};
use crate::storage::HabitStorage;
use crate::ServerError;

/// A slot for today counts as due when it is at most this far ahead of the
/// clock; timers may wake a moment before the wall clock reaches them.
const FIRE_SLACK_SECS: i64 = 5;

/// Result of toggling a check
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub toggle: CheckToggle,
    pub date: NaiveDate,
    /// The habit with freshly computed stats
    pub habit: Habit,
    pub congrats: Option<String>,
    pub reminders_scheduled: usize,
}

/// Summary of the startup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub habits: usize,
    /// Habits whose stats were recomputed
    pub recomputed: usize,
    /// Habits whose stats were left alone because they were done yesterday
    pub kept: usize,
    pub reminders_scheduled: usize,
}

/// Borrowed view over the collaborators a lifecycle operation needs
pub struct Lifecycle<'a, S: ?Sized, J: ?Sized, C> {
    pub storage: &'a S,
    pub scheduler: &'a J,
    pub clock: &'a C,
}

impl<'a, S, J, C> Lifecycle<'a, S, J, C>
where
    S: HabitStorage + ?Sized,
    J: JobScheduler + ?Sized,
    C: Clock,
{
    pub fn new(storage: &'a S, scheduler: &'a J, clock: &'a C) -> Self {
        Self { storage, scheduler, clock }
    }

    /// Engine inputs derived from the clock and the saved settings
    pub fn stats_context(&self) -> Result<StatsContext, ServerError> {
        let settings = self.storage.get_settings()?;
        Ok(StatsContext {
            today: self.clock.today(),
            completion_target: settings.completion_target()?,
            first_day_of_week: settings.first_day_of_week,
        })
    }

    /// Recompute a habit's stats from its whole check history and persist them
    pub fn update_stats_for_habit(&self, habit_id: &HabitId) -> Result<Habit, ServerError> {
        let ctx = self.stats_context()?;
        let habit = self.storage.get_habit(habit_id)?;
        self.recompute(habit, &ctx)
    }

    fn recompute(&self, mut habit: Habit, ctx: &StatsContext) -> Result<Habit, ServerError> {
        let checks = self.storage.list_checks(&habit.id)?;
        let stats = compute_stats(&habit, &check_dates(&checks), ctx);

        self.storage.update_stats(&habit.id, &stats)?;
        debug!(
            "Recomputed stats for habit {}: streak {}, {} points, score {}",
            habit.id, stats.streak, stats.points, stats.score
        );

        habit.stats = stats;
        Ok(habit)
    }

    /// Cancel the habit's pending reminders and schedule the next round.
    ///
    /// Archived habits keep their reminder specs but nothing is scheduled.
    pub fn reschedule_habit(&self, habit: &Habit, skip_today: bool) -> Result<usize, ServerError> {
        if habit.archived {
            self.scheduler.cancel_by_tag(&habit.id);
            return Ok(0);
        }

        let reminders = self.storage.list_reminders(&habit.id)?;
        let requests = plan_reminders(&habit.id, &habit.name, &reminders, &self.clock.now(), skip_today);
        let scheduled = requests.len();

        self.scheduler.replace_for_tag(&habit.id, requests);
        Ok(scheduled)
    }

    /// Line up a habit's reminders again after one of them fired.
    ///
    /// Today's slots that are already due move to the same weekday next
    /// week. Later slots follow whether the habit is done today.
    pub fn rearm_after_fire(&self, habit_id: &HabitId) -> Result<usize, ServerError> {
        let habit = self.storage.get_habit(habit_id)?;
        if habit.archived {
            self.scheduler.cancel_by_tag(&habit.id);
            return Ok(0);
        }

        let now = self.clock.now();
        let today = to_date(&now);
        let due_by = now.naive_local() + Duration::seconds(FIRE_SLACK_SECS);

        let (due, upcoming): (Vec<ReminderSpec>, Vec<ReminderSpec>) = self
            .storage
            .list_reminders(&habit.id)?
            .into_iter()
            .partition(|r| r.day == today.weekday() && today.and_time(r.time) <= due_by);

        let skip_today = habit.stats.is_completed_today(today);
        let mut requests = plan_reminders(&habit.id, &habit.name, &upcoming, &now, skip_today);
        requests.extend(plan_reminders(&habit.id, &habit.name, &due, &now, true));
        let scheduled = requests.len();

        debug!(
            "Re-armed habit {} after a reminder fired: {} due moved to next week, {} scheduled",
            habit.id,
            due.len(),
            scheduled
        );
        self.scheduler.replace_for_tag(&habit.id, requests);
        Ok(scheduled)
    }

    /// Store a new habit with its reminders and schedule them
    pub fn create_habit(&self, habit: Habit, reminders: Vec<ReminderSpec>) -> Result<(Habit, usize), ServerError> {
        self.storage.create_habit(&habit)?;
        self.storage.replace_reminders(&habit.id, &dedup_reminders(reminders))?;

        let scheduled = self.reschedule_habit(&habit, false)?;
        info!("Created habit '{}' ({}) with {} reminder(s) scheduled", habit.name, habit.id, scheduled);
        Ok((habit, scheduled))
    }

    /// Toggle the check for `date` (today when `None`), then refresh stats
    /// and reminders.
    pub fn check_habit(&self, habit_id: &HabitId, date: Option<NaiveDate>) -> Result<CheckOutcome, ServerError> {
        let ctx = self.stats_context()?;
        let date = date.unwrap_or(ctx.today);
        if date > ctx.today {
            return Err(DomainError::InvalidDate(format!(
                "Cannot check {} in the future (today is {})",
                date, ctx.today
            ))
            .into());
        }

        let toggle = self.storage.toggle_check(habit_id, date)?;
        let habit = self.storage.get_habit(habit_id)?;
        let habit = self.recompute(habit, &ctx)?;

        let completed_today = habit.stats.is_completed_today(ctx.today);
        let reminders_scheduled = self.reschedule_habit(&habit, completed_today)?;

        let congrats = match toggle {
            CheckToggle::Completed if completed_today => {
                let encouragements = self.storage.list_encouragements(&habit.id)?;
                let encouragement = choose_encouragement(&encouragements, &mut rand::thread_rng());
                Some(congrats_message(&habit.stats, habit.frequency, encouragement))
            }
            _ => None,
        };

        info!("Habit '{}' on {}: {:?}", habit.name, date, toggle);
        Ok(CheckOutcome {
            toggle,
            date,
            habit,
            congrats,
            reminders_scheduled,
        })
    }

    /// Persist an edited habit, optionally replacing its reminders.
    ///
    /// Frequency or quota may have changed, so stats are recomputed.
    pub fn save_habit(&self, habit: &Habit, reminders: Option<Vec<ReminderSpec>>) -> Result<(Habit, usize), ServerError> {
        self.storage.update_habit(habit)?;
        if let Some(reminders) = reminders {
            self.storage.replace_reminders(&habit.id, &dedup_reminders(reminders))?;
        }

        let ctx = self.stats_context()?;
        let habit = self.recompute(self.storage.get_habit(&habit.id)?, &ctx)?;
        let scheduled = self.reschedule_habit(&habit, habit.stats.is_completed_today(ctx.today))?;

        info!("Saved habit '{}' ({}), {} reminder(s) scheduled", habit.name, habit.id, scheduled);
        Ok((habit, scheduled))
    }

    /// Replace a habit's reminders wholesale and reschedule them
    pub fn save_reminders(&self, habit_id: &HabitId, reminders: Vec<ReminderSpec>) -> Result<usize, ServerError> {
        self.storage.replace_reminders(habit_id, &dedup_reminders(reminders))?;

        let habit = self.storage.get_habit(habit_id)?;
        let skip_today = habit.stats.is_completed_today(self.clock.today());
        self.reschedule_habit(&habit, skip_today)
    }

    /// Replace a habit's encouragements wholesale
    pub fn save_encouragements(&self, habit_id: &HabitId, contents: &[String]) -> Result<usize, ServerError> {
        let encouragements = Encouragement::parse_all(habit_id, contents)?;
        self.storage.replace_encouragements(habit_id, &encouragements)?;
        Ok(encouragements.len())
    }

    /// Cancel a habit's reminders and delete it with its history
    pub fn delete_habit(&self, habit_id: &HabitId) -> Result<Habit, ServerError> {
        let habit = self.storage.get_habit(habit_id)?;

        self.scheduler.cancel_by_tag(habit_id);
        self.storage.delete_habit(habit_id)?;

        info!("Deleted habit '{}' ({})", habit.name, habit.id);
        Ok(habit)
    }

    /// Bring stored stats and pending reminders up to date after a restart.
    ///
    /// A habit last completed yesterday keeps its stats: its streak is still
    /// alive until today ends, and recomputing now would report it broken.
    pub fn reconcile_on_startup(&self) -> Result<ReconcileReport, ServerError> {
        self.scheduler.cancel_all();

        let ctx = self.stats_context()?;
        let habits = self.storage.list_habits(true)?;
        let mut report = ReconcileReport {
            habits: habits.len(),
            ..ReconcileReport::default()
        };

        for habit in habits {
            let habit = if habit.stats.is_completed_yesterday(ctx.today) {
                report.kept += 1;
                habit
            } else {
                report.recomputed += 1;
                self.recompute(habit, &ctx)?
            };

            let skip_today = habit.stats.is_completed_today(ctx.today)
                || habit.stats.is_virtual_completed(ctx.today);
            match self.reschedule_habit(&habit, skip_today) {
                Ok(scheduled) => report.reminders_scheduled += scheduled,
                Err(e) => warn!("Could not schedule reminders for habit {}: {}", habit.id, e),
            }
        }

        info!(
            "Startup reconciliation: {} habit(s), {} recomputed, {} kept, {} reminder(s) scheduled",
            report.habits, report.recomputed, report.kept, report.reminders_scheduled
        );
        Ok(report)
    }

    /// Recompute every habit, e.g. after the completion target changed
    pub fn recompute_all(&self) -> Result<usize, ServerError> {
        let ctx = self.stats_context()?;
        let habits = self.storage.list_habits(true)?;
        let count = habits.len();
        for habit in habits {
            self.recompute(habit, &ctx)?;
        }
        info!("Recomputed stats for {} habit(s)", count);
        Ok(count)
    }

    /// Habits filtered and ordered by `settings`
    pub fn list_habits(&self, settings: &AppSettings) -> Result<Vec<Habit>, ServerError> {
        let habits = self.storage.list_habits(!settings.hide_archived)?;
        Ok(arrange_habits(habits, settings, self.clock.today()))
    }
}

/// Apply the hide and sort settings to a list of habits
pub fn arrange_habits(habits: Vec<Habit>, settings: &AppSettings, today: NaiveDate) -> Vec<Habit> {
    let mut habits: Vec<Habit> = habits
        .into_iter()
        .filter(|h| !(settings.hide_archived && h.archived))
        .filter(|h| !(settings.hide_completed && h.stats.is_virtual_completed(today)))
        .collect();

    habits.sort_by(|a, b| compare_habits(a, b, settings.sort, today));

    if settings.sort_order == SortOrder::Descending {
        habits.reverse();
    }
    habits
}

fn compare_habits(a: &Habit, b: &Habit, sort: HabitSort, today: NaiveDate) -> Ordering {
    let by_points = |x: &HabitStats, y: &HabitStats| x.points.cmp(&y.points);

    match sort {
        HabitSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        HabitSort::Points => by_points(&a.stats, &b.stats),
        HabitSort::Score => a.stats.score.cmp(&b.stats.score).then_with(|| by_points(&a.stats, &b.stats)),
        HabitSort::Streak => a.stats.streak.cmp(&b.stats.streak).then_with(|| by_points(&a.stats, &b.stats)),
        HabitSort::Status => a
            .stats
            .is_virtual_completed(today)
            .cmp(&b.stats.is_virtual_completed(today))
            .then_with(|| by_points(&a.stats, &b.stats)),
        HabitSort::DateCreated => a.created_at.cmp(&b.created_at),
    }
}
