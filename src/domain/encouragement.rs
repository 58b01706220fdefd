/// Per-habit encouragements shown after a check-in

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, HabitId};

/// Longest encouragement accepted
pub const MAX_ENCOURAGEMENT_LEN: usize = 200;

/// Used when a habit has no encouragements of its own
pub const DEFAULT_ENCOURAGEMENTS: [&str; 3] = [
    "Great job, keep going!",
    "Excellent! Remember why you're doing this.",
    "Nice! You're almost there!",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encouragement {
    pub habit_id: HabitId,
    pub content: String,
}

impl Encouragement {
    /// Trimmed, non-empty and at most `MAX_ENCOURAGEMENT_LEN` characters
    pub fn new(habit_id: HabitId, content: &str) -> Result<Self, DomainError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::Validation {
                message: "Encouragement cannot be empty".to_string(),
            });
        }
        if content.chars().count() > MAX_ENCOURAGEMENT_LEN {
            return Err(DomainError::Validation {
                message: format!("Encouragement cannot exceed {} characters", MAX_ENCOURAGEMENT_LEN),
            });
        }
        Ok(Self {
            habit_id,
            content: content.to_string(),
        })
    }

    /// Validate user input, dropping repeated texts
    pub fn parse_all(habit_id: &HabitId, contents: &[String]) -> Result<Vec<Self>, DomainError> {
        let mut encouragements: Vec<Self> = Vec::with_capacity(contents.len());
        for content in contents {
            let encouragement = Self::new(habit_id.clone(), content)?;
            if !encouragements.iter().any(|e| e.content == encouragement.content) {
                encouragements.push(encouragement);
            }
        }
        Ok(encouragements)
    }
}

/// A random encouragement of the habit's own, or a default one
pub fn choose_encouragement<'a, R: Rng + ?Sized>(encouragements: &'a [Encouragement], rng: &mut R) -> &'a str {
    match encouragements.choose(rng) {
        Some(encouragement) => &encouragement.content,
        None => DEFAULT_ENCOURAGEMENTS
            .choose(rng)
            .copied()
            .unwrap_or(DEFAULT_ENCOURAGEMENTS[0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_encouragement_validation() {
        let id = HabitId::new();
        assert_eq!(Encouragement::new(id.clone(), "  Go on!  ").unwrap().content, "Go on!");
        assert!(Encouragement::new(id.clone(), "   ").is_err());
        assert!(Encouragement::new(id, &"a".repeat(MAX_ENCOURAGEMENT_LEN + 1)).is_err());
    }

    #[test]
    fn test_parse_all_drops_repeats() {
        let id = HabitId::new();
        let contents = vec!["One more!".to_string(), " One more! ".to_string(), "Keep it up".to_string()];

        let parsed = Encouragement::parse_all(&id, &contents).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].content, "Keep it up");
    }

    #[test]
    fn test_choose_prefers_own_encouragements() {
        let id = HabitId::new();
        let own = Encouragement::parse_all(&id, &["Breathe".to_string(), "Stay calm".to_string()]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let chosen = choose_encouragement(&own, &mut rng);
            assert!(chosen == "Breathe" || chosen == "Stay calm");
        }
    }

    #[test]
    fn test_choose_falls_back_to_defaults() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert!(DEFAULT_ENCOURAGEMENTS.contains(&choose_encouragement(&[], &mut rng)));
        }
    }
}
