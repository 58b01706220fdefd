/// Progress engine: virtual dates, streaks, points and scores
///
/// Everything in here is a pure function of its inputs. Callers pass the
/// current date explicitly through a `Clock`.

pub mod calendar;
pub mod virtual_dates;
pub mod streak;
pub mod score;
pub mod stats;

pub use calendar::{Clock, FixedClock, SystemClock};
pub use virtual_dates::build_virtual_dates;
pub use streak::{calculate_streaks, group_streaks, today_streak, Streak};
pub use score::{calculate_points, calculate_score, triangular};
pub use stats::{compute_stats, congrats_message, StatsContext};
