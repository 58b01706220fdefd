/// Storage behaviour on a file-backed database
use chrono::{NaiveDate, NaiveTime, Weekday};
use habit_maker_mcp::*;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[cfg(test)]
mod storage_tests {
    use super::*;

    #[test]
    fn test_data_survives_reopen() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        let habit = Habit::new("Write".to_string(), Frequency::Monthly, 4, Some("Blog".to_string())).unwrap();
        {
            let storage = SqliteStorage::new(db_path.clone()).expect("Failed to create storage");
            storage.create_habit(&habit).unwrap();
            storage.toggle_check(&habit.id, date(2024, 2, 1)).unwrap();
            storage
                .replace_reminders(
                    &habit.id,
                    &[ReminderSpec::new(habit.id.clone(), Weekday::Sun, NaiveTime::from_hms_opt(9, 30, 0).unwrap())],
                )
                .unwrap();
        }

        let storage = SqliteStorage::new(db_path).expect("Failed to reopen storage");
        let loaded = storage.get_habit(&habit.id).unwrap();
        assert_eq!(loaded.name, "Write");
        assert_eq!(loaded.frequency, Frequency::Monthly);
        assert_eq!(loaded.times_per_frequency, 4);
        assert_eq!(loaded.notes.as_deref(), Some("Blog"));
        assert_eq!(storage.list_checks(&habit.id).unwrap().len(), 1);
        assert_eq!(storage.list_reminders(&habit.id).unwrap()[0].day, Weekday::Sun);
    }

    #[test]
    fn test_toggle_round_trip_restores_state() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf()).unwrap();
        let habit = Habit::new("Drink water".to_string(), Frequency::Daily, 1, None).unwrap();
        storage.create_habit(&habit).unwrap();
        storage.toggle_check(&habit.id, date(2024, 4, 1)).unwrap();

        let before = storage.list_checks(&habit.id).unwrap();
        assert_eq!(storage.toggle_check(&habit.id, date(2024, 4, 2)).unwrap(), CheckToggle::Completed);
        assert_eq!(storage.toggle_check(&habit.id, date(2024, 4, 2)).unwrap(), CheckToggle::Uncompleted);
        assert_eq!(storage.list_checks(&habit.id).unwrap(), before);
    }

    #[test]
    fn test_storage_is_usable_as_trait_object() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf()).unwrap();

        let dyn_storage: &dyn HabitStorage = &storage;
        assert!(dyn_storage.list_habits(true).unwrap().is_empty());
        assert_eq!(dyn_storage.get_settings().unwrap(), AppSettings::default());
    }
}
