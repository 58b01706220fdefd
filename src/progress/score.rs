/// Points and completion score
///
/// Points reward long unbroken streaks: a streak of n periods is worth the
/// nth triangular number. The score measures lifetime checks against the
/// user's completion target.

use std::num::NonZeroU32;

use crate::domain::Frequency;
use crate::progress::streak::Streak;

/// n(n + 1) / 2
pub fn triangular(n: u64) -> u64 {
    (n * n + n) / 2
}

/// Sum of the triangular bonus over every streak
pub fn calculate_points(frequency: Frequency, streaks: &[Streak]) -> u64 {
    streaks
        .iter()
        .map(|streak| triangular(streak.duration(frequency)))
        .sum()
}

/// Percent of the completion target reached, floored. Not capped at 100.
pub fn calculate_score(check_count: usize, target: NonZeroU32) -> u32 {
    let percent = 100u64 * check_count as u64 / u64::from(target.get());
    u32::try_from(percent).unwrap_or(u32::MAX)
}
