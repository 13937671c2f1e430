//! Long-term goals referenced by task records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A long-term goal. Tasks link to it by `id`; the goal store owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermGoal {
    #[serde(default = "new_goal_id")]
    pub id: String,
    pub description: String,
    /// Free-form duration such as "6 months", "2 years" or "6个月".
    #[serde(default)]
    pub total_duration: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub is_learning_plan: bool,
}

fn new_goal_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl LongTermGoal {
    /// New inactive goal with a generated id.
    pub fn new(description: impl Into<String>, total_duration: impl Into<String>) -> Self {
        Self {
            id: new_goal_id(),
            description: description.into(),
            total_duration: total_duration.into(),
            created_at: Utc::now(),
            active: false,
            is_learning_plan: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn activated(mut self) -> Self {
        self.active = true;
        self
    }

    /// Case-insensitive id comparison, as ids are typed by hand in task files.
    pub fn matches_id(&self, other: &str) -> bool {
        self.id.trim().eq_ignore_ascii_case(other.trim())
    }

    /// Declared duration converted to days; 90 when absent or unparseable.
    pub fn duration_days(&self) -> u32 {
        parse_duration_days(&self.total_duration)
    }
}

/// Parse "6 months", "2年", "3 weeks", "45" into days.
pub fn parse_duration_days(text: &str) -> u32 {
    const FALLBACK_DAYS: u32 = 90;

    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let Ok(value) = digits.parse::<u32>() else {
        return FALLBACK_DAYS;
    };

    let lower = text.to_lowercase();
    let multiplier = if lower.contains('年') || lower.contains("year") {
        365
    } else if lower.contains('月') || lower.contains("month") {
        30
    } else if lower.contains('周') || lower.contains("week") {
        7
    } else {
        1
    };
    value.saturating_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_days() {
        assert_eq!(parse_duration_days("6个月"), 180);
        assert_eq!(parse_duration_days("2 years"), 730);
        assert_eq!(parse_duration_days("3 weeks"), 21);
        assert_eq!(parse_duration_days("45"), 45);
        assert_eq!(parse_duration_days(""), 90);
        assert_eq!(parse_duration_days("someday"), 90);
    }

    #[test]
    fn test_new_goal_is_inactive_with_unique_id() {
        let a = LongTermGoal::new("Ship product", "6 months");
        let b = LongTermGoal::new("Ship product", "6 months");
        assert!(!a.active);
        assert_ne!(a.id, b.id);
        assert!(a.activated().active);
    }

    #[test]
    fn test_matches_id_ignores_case() {
        let goal = LongTermGoal::new("g", "").with_id("Goal-1");
        assert!(goal.matches_id("goal-1"));
        assert!(!goal.matches_id("goal-2"));
    }
}
