/// Virtual date expansion for period-based habits
///
/// A weekly habit checked once in a week should read as an unbroken run of
/// days. Once a period's quota of real checks is met, every day of that
/// period is added to the date set used for streak detection. The expanded
/// set is never persisted.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, Weekday};

use crate::domain::Frequency;
use crate::progress::calendar::period_start;

/// Expand real check dates with the days of every period whose quota was met.
///
/// The result is ascending and free of duplicates. Daily habits are returned
/// as given (sorted).
pub fn build_virtual_dates(
    frequency: Frequency,
    times_per_frequency: u32,
    dates: &[NaiveDate],
    first_day_of_week: Weekday,
) -> Vec<NaiveDate> {
    let real: BTreeSet<NaiveDate> = dates.iter().copied().collect();

    if frequency == Frequency::Daily {
        return real.into_iter().collect();
    }

    let completed = completed_periods(frequency, times_per_frequency, &real, first_day_of_week);

    let mut virtual_dates = real;
    for start in completed {
        for offset in 0..frequency.fill_days() {
            virtual_dates.insert(start + Duration::days(offset));
        }
    }

    virtual_dates.into_iter().collect()
}

/// Starts of the periods whose quota was reached, walking dates in order.
///
/// The running count restarts whenever the period changes. A check landing in
/// an already completed period also restarts it, which never matters since
/// the period is recorded once.
fn completed_periods(
    frequency: Frequency,
    times_per_frequency: u32,
    dates: &BTreeSet<NaiveDate>,
    first_day_of_week: Weekday,
) -> BTreeSet<NaiveDate> {
    let mut completed = BTreeSet::new();
    let mut current: Option<NaiveDate> = None;
    let mut count = 0u32;

    for &date in dates {
        let start = period_start(frequency, date, first_day_of_week);
        if current == Some(start) && !completed.contains(&start) {
            count += 1;
        } else {
            current = Some(start);
            count = 1;
        }
        if count >= times_per_frequency {
            completed.insert(start);
        }
    }

    completed
}
