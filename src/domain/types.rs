/// Core types and enums used throughout the domain layer
///
/// This module defines the fundamental types like Frequency, the sort options
/// and the ID type that are used by Habit, CheckRecord and ReminderSpec.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety. It doubles as the
/// tag under which a habit's pending reminder jobs are grouped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How often a habit should be performed
///
/// Combined with a habit's `times_per_frequency` this defines how many real
/// checks inside one period satisfy that period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Canonical period length in days, used as the streak duration divisor
    pub fn period_days(self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 28,
            Frequency::Yearly => 365,
        }
    }

    /// Number of days synthesized for a period whose quota was met.
    ///
    /// Monthly fills 31 days (the longest month) while `period_days` divides
    /// by 28. Stored stats depend on this pair, keep them as they are.
    pub fn fill_days(self) -> i64 {
        match self {
            Frequency::Monthly => 31,
            other => other.period_days(),
        }
    }

    /// Largest quota a single period of this frequency accepts
    pub fn max_times(self) -> u32 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 28,
            Frequency::Yearly => 365,
        }
    }

    /// Validate a times-per-period quota for this frequency
    pub fn validate_times(self, times: u32) -> Result<(), DomainError> {
        if self == Frequency::Daily && times != 1 {
            return Err(DomainError::InvalidFrequency(
                format!("Daily habits are done exactly once per day, got {}", times)
            ));
        }
        if times == 0 || times > self.max_times() {
            return Err(DomainError::InvalidFrequency(
                format!("{} frequency must be 1-{} times, got {}", self.as_str(), self.max_times(), times)
            ));
        }
        Ok(())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Singular unit used when talking about streak lengths
    pub fn unit(self) -> &'static str {
        match self {
            Frequency::Daily => "day",
            Frequency::Weekly => "week",
            Frequency::Monthly => "month",
            Frequency::Yearly => "year",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(DomainError::InvalidFrequency(
                format!("Invalid frequency '{}'. Valid options: daily, weekly, monthly, yearly", other)
            )),
        }
    }
}

/// What the habit list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitSort {
    #[default]
    Name,
    Points,
    Score,
    Streak,
    /// Whether the habit is (virtually) completed
    Status,
    DateCreated,
}

impl HabitSort {
    pub fn as_str(self) -> &'static str {
        match self {
            HabitSort::Name => "name",
            HabitSort::Points => "points",
            HabitSort::Score => "score",
            HabitSort::Streak => "streak",
            HabitSort::Status => "status",
            HabitSort::DateCreated => "date_created",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(HabitSort::Name),
            "points" => Ok(HabitSort::Points),
            "score" => Ok(HabitSort::Score),
            "streak" => Ok(HabitSort::Streak),
            "status" => Ok(HabitSort::Status),
            "date_created" => Ok(HabitSort::DateCreated),
            other => Err(DomainError::InvalidSetting(
                format!("Invalid sort '{}'. Valid options: name, points, score, streak, status, date_created", other)
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            other => Err(DomainError::InvalidSetting(
                format!("Invalid sort order '{}'. Valid options: ascending, descending", other)
            )),
        }
    }
}

/// Parse a weekday name such as "monday" or "mon"
pub fn parse_weekday(s: &str) -> Result<chrono::Weekday, DomainError> {
    s.trim()
        .parse::<chrono::Weekday>()
        .map_err(|_| DomainError::InvalidReminder(format!("Invalid day of week '{}'", s)))
}
