/// Worked examples for streaks, points, scores and reminders
use std::num::NonZeroU32;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, Weekday};
use habit_maker_mcp::progress::{
    build_virtual_dates, calculate_points, calculate_score, calculate_streaks, compute_stats, Clock,
    FixedClock, StatsContext,
};
use habit_maker_mcp::reminders::resolve_next_fire;
use habit_maker_mcp::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_daily_consecutive_checks() {
        let checks = vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)];
        let streaks = calculate_streaks(Frequency::Daily, 1, &checks, Weekday::Sun);

        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].duration(Frequency::Daily), 3);
        assert_eq!(calculate_points(Frequency::Daily, &streaks), 6);
    }

    #[test]
    fn test_weekly_single_check_covers_the_week() {
        // Wednesday 2024-01-10, week starts Sunday 2024-01-07
        let virtual_dates = build_virtual_dates(Frequency::Weekly, 1, &[date(2024, 1, 10)], Weekday::Sun);
        let expected: Vec<NaiveDate> = (7..=13).map(|d| date(2024, 1, d)).collect();
        assert_eq!(virtual_dates, expected);

        let streaks = calculate_streaks(Frequency::Weekly, 1, &[date(2024, 1, 10)], Weekday::Sun);
        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].duration(Frequency::Weekly), 1);
    }

    #[test]
    fn test_weekly_respects_first_day_of_week() {
        // Same check, but weeks start on Monday 2024-01-08
        let virtual_dates = build_virtual_dates(Frequency::Weekly, 1, &[date(2024, 1, 10)], Weekday::Mon);
        assert_eq!(virtual_dates.first(), Some(&date(2024, 1, 8)));
        assert_eq!(virtual_dates.last(), Some(&date(2024, 1, 14)));
    }

    #[test]
    fn test_weekly_quota_not_met_keeps_real_dates() {
        let checks = vec![date(2024, 1, 8), date(2024, 1, 10)];
        let virtual_dates = build_virtual_dates(Frequency::Weekly, 3, &checks, Weekday::Sun);
        assert_eq!(virtual_dates, checks);
    }

    #[test]
    fn test_monthly_fill_uses_31_days_but_divides_by_28() {
        let checks = vec![date(2024, 2, 5), date(2024, 2, 10)];
        let streaks = calculate_streaks(Frequency::Monthly, 2, &checks, Weekday::Sun);

        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks[0].begin, date(2024, 2, 1));
        assert_eq!(streaks[0].end, date(2024, 3, 2));
        assert_eq!(streaks[0].days(), 31);
        assert_eq!(streaks[0].duration(Frequency::Monthly), 1);
    }

    #[test]
    fn test_completed_today_reminder_moves_to_next_week() {
        // Wednesday 10:00, reminder Wednesday 20:00, already checked today
        let clock = FixedClock::utc(date(2024, 1, 10), 10, 0);
        let reminder = ReminderSpec::new(HabitId::new(), Weekday::Wed, NaiveTime::from_hms_opt(20, 0, 0).unwrap());

        let skipped = resolve_next_fire(&reminder, &clock.now(), true).unwrap();
        assert_eq!(skipped, Some(Duration::from_secs((7 * 24 + 10) * 3600)));

        let same_day = resolve_next_fire(&reminder, &clock.now(), false).unwrap();
        assert_eq!(same_day, Some(Duration::from_secs(10 * 3600)));
    }

    #[test]
    fn test_score_half_of_target() {
        let target = NonZeroU32::new(66).unwrap();
        assert_eq!(calculate_score(33, target), 50);
        assert_eq!(calculate_score(0, target), 0);
        assert_eq!(calculate_score(132, target), 200);
    }

    #[test]
    fn test_full_stats_for_weekly_habit() {
        let habit = Habit::new("Long run".to_string(), Frequency::Weekly, 2, None).unwrap();
        // Two full weeks, each with two checks
        let checks = vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 8), date(2024, 1, 9)];
        let ctx = StatsContext {
            today: date(2024, 1, 10),
            completion_target: NonZeroU32::new(66).unwrap(),
            first_day_of_week: Weekday::Sun,
        };

        let stats = compute_stats(&habit, &checks, &ctx);

        // 2023-12-31 .. 2024-01-13 is 14 days, two weeks
        assert_eq!(stats.streak, 2);
        assert_eq!(stats.points, 3);
        assert_eq!(stats.last_streak_end, Some(date(2024, 1, 13)));
        assert_eq!(stats.last_completed, Some(date(2024, 1, 9)));
        assert_eq!(stats.completed, 4);
        assert!(stats.is_virtual_completed(ctx.today));
        assert!(!stats.is_completed_today(ctx.today));
    }

    #[test]
    fn test_broken_daily_streak_reports_zero() {
        let habit = Habit::new("Floss".to_string(), Frequency::Daily, 1, None).unwrap();
        let checks = vec![date(2024, 1, 1), date(2024, 1, 2)];
        let ctx = StatsContext {
            today: date(2024, 1, 5),
            completion_target: NonZeroU32::new(66).unwrap(),
            first_day_of_week: Weekday::Sun,
        };

        let stats = compute_stats(&habit, &checks, &ctx);
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.points, 3);
        assert_eq!(stats.last_streak_end, Some(date(2024, 1, 2)));
    }
}
