/// Properties of the progress engine over generated check histories
use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, Weekday};
use habit_maker_mcp::progress::{build_virtual_dates, calculate_streaks, group_streaks, triangular};
use habit_maker_mcp::Frequency;

/// Small deterministic generator so failures are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

fn random_dates(rng: &mut Lcg, span_days: u64, count: usize) -> Vec<NaiveDate> {
    let origin = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..count)
        .map(|_| origin + Duration::days(rng.below(span_days) as i64))
        .collect()
}

const FREQUENCIES: [Frequency; 4] = [Frequency::Daily, Frequency::Weekly, Frequency::Monthly, Frequency::Yearly];
const WEEKDAYS: [Weekday; 3] = [Weekday::Sun, Weekday::Mon, Weekday::Sat];

fn cases() -> Vec<(Frequency, u32, Vec<NaiveDate>, Weekday)> {
    let mut rng = Lcg(0x5eed);
    let mut cases = Vec::new();
    for _ in 0..200 {
        let frequency = FREQUENCIES[rng.below(4) as usize];
        let times = 1 + rng.below(frequency.max_times().min(5) as u64) as u32;
        let span = match frequency {
            Frequency::Yearly => 1500,
            _ => 400,
        };
        let count = rng.below(60) as usize;
        let dates = random_dates(&mut rng, span, count);
        let weekday = WEEKDAYS[rng.below(3) as usize];
        cases.push((frequency, times, dates, weekday));
    }
    cases
}

#[cfg(test)]
mod property_tests {
    use super::*;

    #[test]
    fn test_daily_is_never_expanded() {
        for (_, _, dates, weekday) in cases() {
            let unique: Vec<NaiveDate> = dates.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
            assert_eq!(build_virtual_dates(Frequency::Daily, 1, &dates, weekday), unique);
        }
    }

    #[test]
    fn test_virtual_dates_are_a_sorted_superset() {
        for (frequency, times, dates, weekday) in cases() {
            let virtual_dates = build_virtual_dates(frequency, times, &dates, weekday);

            assert!(virtual_dates.windows(2).all(|w| w[0] < w[1]), "not strictly ascending");
            for date in &dates {
                assert!(virtual_dates.contains(date), "{} missing for {:?}", date, frequency);
            }
        }
    }

    #[test]
    fn test_expansion_is_a_fixed_point_outside_monthly() {
        for (frequency, times, dates, weekday) in cases() {
            if frequency == Frequency::Monthly {
                continue;
            }
            let once = build_virtual_dates(frequency, times, &dates, weekday);
            let twice = build_virtual_dates(frequency, times, &once, weekday);
            assert_eq!(once, twice, "{:?} x{} not idempotent", frequency, times);
        }
    }

    #[test]
    fn test_streaks_partition_the_virtual_dates() {
        for (frequency, times, dates, weekday) in cases() {
            let virtual_dates = build_virtual_dates(frequency, times, &dates, weekday);
            let streaks = calculate_streaks(frequency, times, &dates, weekday);

            for pair in streaks.windows(2) {
                assert!(
                    pair[1].begin > pair[0].end + Duration::days(1),
                    "streaks overlap or touch"
                );
            }

            let covered: Vec<NaiveDate> = streaks
                .iter()
                .flat_map(|s| (0..s.days()).map(move |i| s.begin + Duration::days(i)))
                .collect();
            assert_eq!(covered, virtual_dates);
        }
    }

    #[test]
    fn test_group_streaks_ignores_order_and_duplicates() {
        let mut rng = Lcg(42);
        for _ in 0..50 {
            let dates = random_dates(&mut rng, 60, 40);
            let mut shuffled = dates.clone();
            shuffled.reverse();
            shuffled.extend(dates.iter().take(5).copied());

            assert_eq!(group_streaks(&dates), group_streaks(&shuffled));
        }
    }

    #[test]
    fn test_triangular_is_exact_and_monotonic() {
        let mut previous = 0;
        for n in 0..=10_000u64 {
            let value = triangular(n);
            assert_eq!(value, n * (n + 1) / 2);
            assert!(value >= previous);
            previous = value;
        }
    }
}
