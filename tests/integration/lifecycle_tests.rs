/// Startup reconciliation and check-in flows with a recording scheduler
use std::sync::Mutex;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, Utc, Weekday};
use habit_maker_mcp::reminders::ScheduleRequest;
use habit_maker_mcp::*;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Keeps requests instead of running timers
#[derive(Default)]
struct RecordingScheduler {
    pending: Mutex<Vec<ScheduleRequest>>,
    cancel_all_calls: Mutex<usize>,
}

impl RecordingScheduler {
    fn delays_for(&self, tag: &HabitId) -> Vec<Duration> {
        let mut delays: Vec<Duration> = self
            .pending
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.tag == tag)
            .map(|r| r.delay)
            .collect();
        delays.sort();
        delays
    }
}

impl JobScheduler for RecordingScheduler {
    fn enqueue(&self, request: ScheduleRequest) {
        self.pending.lock().unwrap().push(request);
    }

    fn cancel_by_tag(&self, tag: &HabitId) {
        self.pending.lock().unwrap().retain(|r| &r.tag != tag);
    }

    fn cancel_all(&self) {
        *self.cancel_all_calls.lock().unwrap() += 1;
        self.pending.lock().unwrap().clear();
    }
}

struct Fixture {
    _temp_file: NamedTempFile,
    storage: SqliteStorage,
    scheduler: RecordingScheduler,
    clock: FixedClock<Utc>,
}

impl Fixture {
    /// Wednesday 2024-01-10, 10:00 UTC
    fn new() -> Self {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf()).expect("Failed to create storage");
        Self {
            _temp_file: temp_file,
            storage,
            scheduler: RecordingScheduler::default(),
            clock: FixedClock::utc(date(2024, 1, 10), 10, 0),
        }
    }

    fn lifecycle(&self) -> Lifecycle<'_, SqliteStorage, RecordingScheduler, FixedClock<Utc>> {
        Lifecycle::new(&self.storage, &self.scheduler, &self.clock)
    }

    fn add_habit(&self, name: &str, frequency: Frequency, times: u32, checks: &[NaiveDate]) -> HabitId {
        let habit = Habit::new(name.to_string(), frequency, times, None).unwrap();
        self.storage.create_habit(&habit).unwrap();
        for &day in checks {
            self.storage.toggle_check(&habit.id, day).unwrap();
        }
        habit.id
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_startup_keeps_stats_of_habit_done_yesterday() {
        let fixture = Fixture::new();
        let habit_id = fixture.add_habit("Push-ups", Frequency::Daily, 1, &[date(2024, 1, 8), date(2024, 1, 9)]);
        let stored = HabitStats {
            points: 3,
            score: 3,
            streak: 2,
            last_streak_end: Some(date(2024, 1, 9)),
            last_completed: Some(date(2024, 1, 9)),
            completed: 2,
        };
        fixture.storage.update_stats(&habit_id, &stored).unwrap();

        let report = fixture.lifecycle().reconcile_on_startup().unwrap();

        assert_eq!(report.kept, 1);
        assert_eq!(report.recomputed, 0);
        assert_eq!(fixture.storage.get_habit(&habit_id).unwrap().stats, stored);
    }

    #[test]
    fn test_startup_recomputes_stale_stats() {
        let fixture = Fixture::new();
        let habit_id = fixture.add_habit("Yoga", Frequency::Daily, 1, &[date(2024, 1, 6), date(2024, 1, 7)]);
        let stale = HabitStats {
            streak: 2,
            last_completed: Some(date(2024, 1, 7)),
            ..HabitStats::default()
        };
        fixture.storage.update_stats(&habit_id, &stale).unwrap();

        let report = fixture.lifecycle().reconcile_on_startup().unwrap();

        assert_eq!(report.recomputed, 1);
        let stats = fixture.storage.get_habit(&habit_id).unwrap().stats;
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.points, 3);
        assert_eq!(stats.completed, 2);
    }

    #[test]
    fn test_startup_cancels_everything_then_skips_virtually_completed_today() {
        let fixture = Fixture::new();
        // Weekly habit done on Monday; the week is covered through Saturday
        let covered = fixture.add_habit("Call mum", Frequency::Weekly, 1, &[date(2024, 1, 8)]);
        let pending = fixture.add_habit("Budget", Frequency::Weekly, 1, &[]);
        for habit_id in [&covered, &pending] {
            fixture
                .storage
                .replace_reminders(habit_id, &[ReminderSpec::new(habit_id.clone(), Weekday::Wed, at(20, 0))])
                .unwrap();
        }
        // Stale job from a previous run
        fixture.scheduler.enqueue(ScheduleRequest {
            delay: Duration::from_secs(1),
            payload: reminders::ReminderPayload { habit_id: pending.clone(), habit_title: "old".to_string() },
            tag: pending.clone(),
        });

        let report = fixture.lifecycle().reconcile_on_startup().unwrap();

        assert_eq!(*fixture.scheduler.cancel_all_calls.lock().unwrap(), 1);
        assert_eq!(report.reminders_scheduled, 2);
        assert_eq!(fixture.scheduler.delays_for(&covered), vec![Duration::from_secs((7 * 24 + 10) * 3600)]);
        assert_eq!(fixture.scheduler.delays_for(&pending), vec![Duration::from_secs(10 * 3600)]);
    }

    #[test]
    fn test_check_today_pushes_todays_reminder_to_next_week() {
        let fixture = Fixture::new();
        let habit_id = fixture.add_habit("Read", Frequency::Daily, 1, &[]);
        fixture
            .lifecycle()
            .save_reminders(
                &habit_id,
                vec![
                    ReminderSpec::new(habit_id.clone(), Weekday::Wed, at(20, 0)),
                    ReminderSpec::new(habit_id.clone(), Weekday::Thu, at(8, 0)),
                ],
            )
            .unwrap();
        assert_eq!(
            fixture.scheduler.delays_for(&habit_id),
            vec![Duration::from_secs(10 * 3600), Duration::from_secs(22 * 3600)]
        );

        let outcome = fixture.lifecycle().check_habit(&habit_id, None).unwrap();
        assert_eq!(outcome.toggle, CheckToggle::Completed);
        assert_eq!(outcome.reminders_scheduled, 2);
        assert_eq!(
            fixture.scheduler.delays_for(&habit_id),
            vec![Duration::from_secs(22 * 3600), Duration::from_secs((7 * 24 + 10) * 3600)]
        );

        // Unchecking brings today's reminder back
        fixture.lifecycle().check_habit(&habit_id, None).unwrap();
        assert_eq!(
            fixture.scheduler.delays_for(&habit_id),
            vec![Duration::from_secs(10 * 3600), Duration::from_secs(22 * 3600)]
        );
    }

    #[test]
    fn test_check_reports_congrats_only_for_today() {
        let fixture = Fixture::new();
        let habit_id = fixture.add_habit("Meditate", Frequency::Daily, 1, &[date(2024, 1, 9)]);

        let past = fixture.lifecycle().check_habit(&habit_id, Some(date(2024, 1, 8))).unwrap();
        assert!(past.congrats.is_none());

        let today = fixture.lifecycle().check_habit(&habit_id, None).unwrap();
        let congrats = today.congrats.expect("congrats for today's check");
        let mut lines = congrats.lines();
        let encouragement = lines.next().unwrap().trim_start_matches("🎉 ");
        assert!(DEFAULT_ENCOURAGEMENTS.contains(&encouragement));
        assert_eq!(lines.next(), Some("You're on a 3 day streak! (+6 points)"));
        assert_eq!(today.habit.stats.points, 6);
    }

    #[test]
    fn test_delete_cancels_pending_jobs() {
        let fixture = Fixture::new();
        let habit_id = fixture.add_habit("Plants", Frequency::Weekly, 1, &[]);
        fixture
            .lifecycle()
            .save_reminders(&habit_id, vec![ReminderSpec::new(habit_id.clone(), Weekday::Sat, at(9, 0))])
            .unwrap();
        assert_eq!(fixture.scheduler.delays_for(&habit_id).len(), 1);

        fixture.lifecycle().delete_habit(&habit_id).unwrap();

        assert!(fixture.scheduler.delays_for(&habit_id).is_empty());
        assert!(fixture.storage.get_habit(&habit_id).is_err());
    }
}
