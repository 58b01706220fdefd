/// Habit entity and its persisted statistics
///
/// This module defines the Habit struct that represents something the user
/// wants to do regularly, along with the stats snapshot the progress engine
/// writes back after every check-in, undo or startup reconciliation.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::{Frequency, HabitId, DomainError};

/// A habit the user checks off over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Study Chinese for 10m")
    pub name: String,
    /// Length of one period
    pub frequency: Frequency,
    /// Real checks needed inside one period to satisfy it
    pub times_per_frequency: u32,
    /// Optional free-form notes
    pub notes: Option<String>,
    /// Archived habits keep their history but can be hidden
    pub archived: bool,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Last computed statistics
    pub stats: HabitStats,
}

/// Derived statistics persisted on the habit.
///
/// Always recomputed from the full check history, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStats {
    /// Sum of the triangular bonus over every streak
    pub points: u64,
    /// Lifetime checks as a percentage of the completion target (may exceed 100)
    pub score: u32,
    /// Length of the live streak in period units, 0 when broken
    pub streak: u64,
    /// End of the latest streak over virtual dates. May lie in the future
    /// for weekly, monthly and yearly habits.
    pub last_streak_end: Option<NaiveDate>,
    /// Most recent real check
    pub last_completed: Option<NaiveDate>,
    /// Total number of real checks
    pub completed: u32,
}

impl HabitStats {
    /// Whether a real check exists for `today`
    pub fn is_completed_today(&self, today: NaiveDate) -> bool {
        self.last_completed == Some(today)
    }

    /// Whether the most recent real check was yesterday
    pub fn is_completed_yesterday(&self, today: NaiveDate) -> bool {
        self.last_completed == Some(today - Duration::days(1))
    }

    /// Whether today is covered by the latest streak, real or virtual.
    ///
    /// A weekly habit checked on Monday stays virtually completed for the
    /// rest of that week.
    pub fn is_virtual_completed(&self, today: NaiveDate) -> bool {
        self.last_streak_end.map_or(false, |end| end >= today)
    }
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// This is the main constructor that validates all fields and returns
    /// an error if any validation fails.
    pub fn new(
        name: String,
        frequency: Frequency,
        times_per_frequency: u32,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_notes(&notes)?;
        frequency.validate_times(times_per_frequency)?;

        Ok(Self {
            id: HabitId::new(),
            name: name.trim().to_string(),
            frequency,
            times_per_frequency,
            notes,
            archived: false,
            created_at: Utc::now(),
            stats: HabitStats::default(),
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated and is mainly used
    /// by the storage layer when loading habits from the database.
    pub fn from_existing(
        id: HabitId,
        name: String,
        frequency: Frequency,
        times_per_frequency: u32,
        notes: Option<String>,
        archived: bool,
        created_at: DateTime<Utc>,
        stats: HabitStats,
    ) -> Self {
        Self {
            id,
            name,
            frequency,
            times_per_frequency,
            notes,
            archived,
            created_at,
            stats,
        }
    }

    /// Update the habit's properties with validation
    ///
    /// Frequency and quota are validated together, so switching a weekly
    /// habit with a quota of 3 to daily without also passing a quota of 1
    /// is rejected. Stats are left alone; the caller recomputes them.
    pub fn update(
        &mut self,
        name: Option<String>,
        frequency: Option<Frequency>,
        times_per_frequency: Option<u32>,
        notes: Option<Option<String>>,
        archived: Option<bool>,
    ) -> Result<(), DomainError> {
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }
        if let Some(ref new_notes) = notes {
            Self::validate_notes(new_notes)?;
        }

        let new_frequency = frequency.unwrap_or(self.frequency);
        let new_times = times_per_frequency.unwrap_or(self.times_per_frequency);
        new_frequency.validate_times(new_times)?;

        if let Some(new_name) = name {
            self.name = new_name.trim().to_string();
        }
        if let Some(new_notes) = notes {
            self.notes = new_notes;
        }
        if let Some(new_archived) = archived {
            self.archived = new_archived;
        }
        self.frequency = new_frequency;
        self.times_per_frequency = new_times;

        Ok(())
    }

    /// Short description of the frequency (e.g., "3x weekly")
    pub fn frequency_display(&self) -> String {
        if self.times_per_frequency > 1 {
            format!("{}x {}", self.times_per_frequency, self.frequency.as_str())
        } else {
            self.frequency.as_str().to_string()
        }
    }

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(text) = notes {
            if text.chars().count() > 500 {
                return Err(DomainError::Validation {
                    message: "Notes cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}
