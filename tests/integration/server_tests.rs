/// Server wiring with the tokio-backed reminder scheduler
use chrono::{Duration, Local, Timelike};
use habit_maker_mcp::*;
use tempfile::NamedTempFile;

#[cfg(test)]
mod server_tests {
    use super::*;

    #[tokio::test]
    async fn test_server_basic_workflow() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = HabitMakerServer::new(temp_file.path().to_path_buf())
            .await
            .expect("Failed to create server");

        let habit = Habit::new("Stretch".to_string(), Frequency::Daily, 1, None).unwrap();
        let (habit, _) = server.lifecycle().create_habit(habit, vec![]).unwrap();

        let outcome = server.lifecycle().check_habit(&habit.id, None).unwrap();
        assert_eq!(outcome.toggle, CheckToggle::Completed);
        assert_eq!(outcome.habit.stats.streak, 1);
        assert_eq!(server.storage().get_habit(&habit.id).unwrap().stats.points, 1);
    }

    #[tokio::test]
    async fn test_reminders_are_pending_after_startup() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        // A reminder on tomorrow's weekday is always in the future
        let tomorrow = Local::now() + Duration::days(1);
        let habit = Habit::new("Journal".to_string(), Frequency::Weekly, 1, None).unwrap();
        let reminder = ReminderSpec::new(
            habit.id.clone(),
            chrono::Datelike::weekday(&tomorrow.date_naive()),
            chrono::NaiveTime::from_hms_opt(tomorrow.hour(), 0, 0).unwrap(),
        );
        {
            let storage = SqliteStorage::new(db_path.clone()).unwrap();
            storage.create_habit(&habit).unwrap();
            storage.replace_reminders(&habit.id, &[reminder]).unwrap();
        }

        let server = HabitMakerServer::new(db_path).await.expect("Failed to create server");
        let report = server.lifecycle().reconcile_on_startup().unwrap();

        assert_eq!(report.habits, 1);
        assert_eq!(report.reminders_scheduled, 1);
        assert_eq!(server.scheduler().pending_for(&habit.id), 1);

        server.lifecycle().delete_habit(&habit.id).unwrap();
        assert_eq!(server.scheduler().pending_for(&habit.id), 0);
    }

    #[tokio::test]
    async fn test_database_persistence() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        {
            let server = HabitMakerServer::new(db_path.clone())
                .await
                .expect("Failed to create first server");
            let habit = Habit::new("Guitar".to_string(), Frequency::Weekly, 3, None).unwrap();
            server.lifecycle().create_habit(habit, vec![]).unwrap();
        }

        let server = HabitMakerServer::new(db_path)
            .await
            .expect("Failed to create second server");
        let habits = server.storage().list_habits(true).unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].frequency_display(), "3x weekly");
    }
}
