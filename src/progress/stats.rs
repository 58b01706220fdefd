/// Full statistics recomputation for one habit
///
/// Stats are derived from the complete check history every time. Nothing is
/// incremented in place, so stored values cannot drift from the checks.

use std::num::NonZeroU32;

use chrono::{NaiveDate, Weekday};

use crate::domain::{Frequency, Habit, HabitStats};
use crate::progress::score::{calculate_points, calculate_score, triangular};
use crate::progress::streak::{calculate_streaks, today_streak};

/// Inputs that do not come from the habit itself
#[derive(Debug, Clone, Copy)]
pub struct StatsContext {
    pub today: NaiveDate,
    pub completion_target: NonZeroU32,
    pub first_day_of_week: Weekday,
}

/// Recompute every stat of `habit` from its real check dates
pub fn compute_stats(habit: &Habit, check_dates: &[NaiveDate], ctx: &StatsContext) -> HabitStats {
    let streaks = calculate_streaks(
        habit.frequency,
        habit.times_per_frequency,
        check_dates,
        ctx.first_day_of_week,
    );
    let last_streak = streaks.last();

    HabitStats {
        points: calculate_points(habit.frequency, &streaks),
        score: calculate_score(check_dates.len(), ctx.completion_target),
        streak: today_streak(habit.frequency, last_streak, ctx.today),
        last_streak_end: last_streak.map(|s| s.end),
        last_completed: check_dates.iter().max().copied(),
        completed: u32::try_from(check_dates.len()).unwrap_or(u32::MAX),
    }
}

/// Message shown after checking a habit off today.
///
/// The encouragement always leads; the streak line follows only while a
/// streak is alive.
pub fn congrats_message(stats: &HabitStats, frequency: Frequency, encouragement: &str) -> String {
    let mut message = format!("🎉 {}", encouragement);
    if stats.streak > 0 {
        message.push_str(&format!(
            "\nYou're on a {} {} streak! (+{} points)",
            stats.streak,
            frequency.unit(),
            triangular(stats.streak)
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ctx(today: NaiveDate) -> StatsContext {
        StatsContext {
            today,
            completion_target: NonZeroU32::new(66).unwrap(),
            first_day_of_week: Weekday::Sun,
        }
    }

    #[test]
    fn test_daily_three_day_streak() {
        let habit = Habit::new("Read".to_string(), Frequency::Daily, 1, None).unwrap();
        let checks = vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)];

        let stats = compute_stats(&habit, &checks, &ctx(date(2024, 1, 3)));
        assert_eq!(stats.points, 6);
        assert_eq!(stats.streak, 3);
        assert_eq!(stats.score, 4);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.last_completed, Some(date(2024, 1, 3)));
        assert_eq!(stats.last_streak_end, Some(date(2024, 1, 3)));
    }

    #[test]
    fn test_daily_streak_broken_after_gap() {
        let habit = Habit::new("Read".to_string(), Frequency::Daily, 1, None).unwrap();
        let checks = vec![date(2024, 1, 1), date(2024, 1, 2)];

        let stats = compute_stats(&habit, &checks, &ctx(date(2024, 1, 4)));
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.points, 3);
    }

    #[test]
    fn test_weekly_streak_end_in_future() {
        let habit = Habit::new("Swim".to_string(), Frequency::Weekly, 1, None).unwrap();
        // Wednesday
        let checks = vec![date(2024, 1, 10)];

        let stats = compute_stats(&habit, &checks, &ctx(date(2024, 1, 10)));
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.points, 1);
        assert_eq!(stats.last_streak_end, Some(date(2024, 1, 13)));
        assert!(stats.is_virtual_completed(date(2024, 1, 12)));
    }

    #[test]
    fn test_no_checks() {
        let habit = Habit::new("Swim".to_string(), Frequency::Monthly, 2, None).unwrap();
        let stats = compute_stats(&habit, &[], &ctx(date(2024, 1, 10)));
        assert_eq!(stats, HabitStats::default());
    }

    #[test]
    fn test_congrats_message() {
        let stats = HabitStats { streak: 3, ..HabitStats::default() };
        assert_eq!(
            congrats_message(&stats, Frequency::Weekly, "Keep going"),
            "🎉 Keep going\nYou're on a 3 week streak! (+6 points)"
        );
        assert_eq!(
            congrats_message(&HabitStats::default(), Frequency::Daily, "Keep going"),
            "🎉 Keep going"
        );
    }
}
