/// Streak calculation over virtual dates
///
/// A streak is a maximal run of consecutive days. Its length is reported in
/// units of the habit's period, so seven days of a weekly habit is a streak
/// of one.

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::Frequency;
use crate::progress::virtual_dates::build_virtual_dates;

/// An inclusive run of consecutive dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl Streak {
    pub fn new(begin: NaiveDate, end: NaiveDate) -> Self {
        Self { begin, end }
    }

    /// Number of days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.begin).num_days() + 1
    }

    /// Length in whole periods of `frequency`, truncated
    pub fn duration(&self, frequency: Frequency) -> u64 {
        (self.days() / frequency.period_days()).max(0) as u64
    }
}

/// Group dates into maximal runs of consecutive days, oldest first.
///
/// Input may be unsorted and contain duplicates.
pub fn group_streaks(dates: &[NaiveDate]) -> Vec<Streak> {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let Some((&first, rest)) = sorted.split_first() else {
        return Vec::new();
    };

    let mut streaks = Vec::new();
    let mut begin = first;
    let mut end = first;

    for &current in rest {
        if current == begin - Duration::days(1) {
            begin = current;
        } else {
            streaks.push(Streak::new(begin, end));
            begin = current;
            end = current;
        }
    }
    streaks.push(Streak::new(begin, end));
    streaks.reverse();

    streaks
}

/// Expand the real check dates and group them into streaks
pub fn calculate_streaks(
    frequency: Frequency,
    times_per_frequency: u32,
    dates: &[NaiveDate],
    first_day_of_week: Weekday,
) -> Vec<Streak> {
    let virtual_dates = build_virtual_dates(frequency, times_per_frequency, dates, first_day_of_week);
    let streaks = group_streaks(&virtual_dates);
    tracing::trace!(
        "Streaks: {}",
        streaks
            .iter()
            .map(|s| format!("{} - {}", s.begin, s.end))
            .collect::<Vec<_>>()
            .join(", ")
    );
    streaks
}

/// Length of the live streak.
///
/// The last streak counts only while its end is on or after `today`; for
/// period habits that end is often in the future.
pub fn today_streak(frequency: Frequency, last_streak: Option<&Streak>, today: NaiveDate) -> u64 {
    match last_streak {
        Some(streak) if streak.end >= today => streak.duration(frequency),
        _ => 0,
    }
}
