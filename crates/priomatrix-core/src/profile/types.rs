//! Suggestion-feedback types for the user profile.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Intervention offered for a stuck task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StuckAction {
    #[serde(rename = "start_10_min")]
    Start10Min,
    #[serde(rename = "split_20_min")]
    Split20Min,
    DelegateOrDrop,
    PauseAndSwitch,
    DecisionNow,
}

impl StuckAction {
    /// Catalog order; also the tie-break order.
    pub const ALL: [StuckAction; 5] = [
        StuckAction::Start10Min,
        StuckAction::Split20Min,
        StuckAction::DelegateOrDrop,
        StuckAction::PauseAndSwitch,
        StuckAction::DecisionNow,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            StuckAction::Start10Min => "start_10_min",
            StuckAction::Split20Min => "split_20_min",
            StuckAction::DelegateOrDrop => "delegate_or_drop",
            StuckAction::PauseAndSwitch => "pause_and_switch",
            StuckAction::DecisionNow => "decision_now",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.id().eq_ignore_ascii_case(id))
    }

    /// User-facing prompt for a task stuck for `hours`.
    pub fn prompt(&self, hours: i64) -> String {
        match self {
            StuckAction::Start10Min => format!(
                "Stuck for about {hours}h: do a 10-minute minimal step, then expand."
            ),
            StuckAction::Split20Min => format!(
                "Stuck for about {hours}h: carve out one 20-minute subtask and schedule it today."
            ),
            StuckAction::DelegateOrDrop => format!(
                "Stuck for about {hours}h: decide whether to delegate it or lower its priority."
            ),
            StuckAction::PauseAndSwitch => format!(
                "Stuck for about {hours}h: pause this task and switch to something more critical."
            ),
            StuckAction::DecisionNow => format!(
                "Stuck for about {hours}h: make one decision now: continue, postpone or drop."
            ),
        }
    }
}

impl fmt::Display for StuckAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Response to a shown suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackOutcome {
    Accepted,
    Deferred,
    Rejected,
}

impl FromStr for FeedbackOutcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accepted" | "accept" => Ok(FeedbackOutcome::Accepted),
            "deferred" | "defer" => Ok(FeedbackOutcome::Deferred),
            "rejected" | "reject" => Ok(FeedbackOutcome::Rejected),
            other => Err(ValidationError::InvalidValue {
                field: "outcome".into(),
                message: format!("expected accepted, deferred or rejected, got '{other}'"),
            }),
        }
    }
}

/// How the user answered a task reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderOutcome {
    /// Task marked done from the reminder.
    Completed,
    /// Task edited or progress logged from the reminder.
    Updated,
    Snoozed,
    Dismissed,
}

impl FromStr for ReminderOutcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "done" => Ok(ReminderOutcome::Completed),
            "updated" | "update" => Ok(ReminderOutcome::Updated),
            "snoozed" | "snooze" => Ok(ReminderOutcome::Snoozed),
            "dismissed" | "dismiss" => Ok(ReminderOutcome::Dismissed),
            other => Err(ValidationError::InvalidValue {
                field: "outcome".into(),
                message: format!("expected completed, updated, snoozed or dismissed, got '{other}'"),
            }),
        }
    }
}

/// Lifetime reminder counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReminderStats {
    #[serde(default)]
    pub shown: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub snoozed: u64,
    #[serde(default)]
    pub dismissed: u64,
}

impl ReminderStats {
    pub fn record(&mut self, outcome: ReminderOutcome) {
        match outcome {
            ReminderOutcome::Completed => self.completed += 1,
            ReminderOutcome::Updated => self.updated += 1,
            ReminderOutcome::Snoozed => self.snoozed += 1,
            ReminderOutcome::Dismissed => self.dismissed += 1,
        }
    }

    /// Reminders answered with progress.
    pub fn engaged(&self) -> u64 {
        self.completed + self.updated
    }

    /// Reminders pushed away.
    pub fn avoided(&self) -> u64 {
        self.snoozed + self.dismissed
    }

    pub fn responses(&self) -> u64 {
        self.engaged() + self.avoided()
    }

    /// More reminders snoozed or dismissed than acted on.
    pub fn is_avoidance_heavy(&self) -> bool {
        self.avoided() > self.engaged()
    }
}

/// Kind of a logged suggestion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionEventKind {
    Shown,
    Accepted,
    Deferred,
    Rejected,
}

impl From<FeedbackOutcome> for SuggestionEventKind {
    fn from(outcome: FeedbackOutcome) -> Self {
        match outcome {
            FeedbackOutcome::Accepted => SuggestionEventKind::Accepted,
            FeedbackOutcome::Deferred => SuggestionEventKind::Deferred,
            FeedbackOutcome::Rejected => SuggestionEventKind::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionEvent {
    pub action_id: String,
    pub kind: SuggestionEventKind,
    pub created_at: DateTime<Utc>,
}

/// Lifetime counters for one action id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionStats {
    #[serde(default)]
    pub shown: u64,
    #[serde(default)]
    pub accepted: u64,
    #[serde(default)]
    pub deferred: u64,
    #[serde(default)]
    pub rejected: u64,
}

impl ActionStats {
    pub fn feedback_total(&self) -> u64 {
        self.accepted + self.deferred + self.rejected
    }

    /// Laplace-smoothed acceptance: `(accepted + 1) / (shown + 2)`.
    ///
    /// Unobserved actions sit at the neutral 0.5.
    pub fn acceptance_rate(&self) -> f64 {
        let shown = self.shown.max(self.feedback_total());
        (self.accepted as f64 + 1.0) / (shown as f64 + 2.0)
    }
}

/// Durable learning state, stored as `profile/user_profile.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfileState {
    #[serde(default = "Utc::now")]
    pub last_updated_at: DateTime<Utc>,
    /// Counters per action id. Entries are never removed.
    #[serde(default)]
    pub actions: BTreeMap<String, ActionStats>,
    /// Recent events backing windowed metrics, pruned by age and count.
    #[serde(default)]
    pub events: Vec<SuggestionEvent>,
    #[serde(default)]
    pub reminders: ReminderStats,
    /// Reminder interactions per local hour of day (0-23).
    #[serde(default)]
    pub active_hours: BTreeMap<u32, u64>,
}

impl Default for UserProfileState {
    fn default() -> Self {
        Self {
            last_updated_at: Utc::now(),
            actions: BTreeMap::new(),
            events: Vec::new(),
            reminders: ReminderStats::default(),
            active_hours: BTreeMap::new(),
        }
    }
}

impl UserProfileState {
    /// Up to `n` busiest hours, busiest first; ties go to the earlier hour.
    pub fn peak_hours(&self, n: usize) -> Vec<u32> {
        let mut hours: Vec<(u32, u64)> = self
            .active_hours
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(hour, count)| (*hour, *count))
            .collect();
        hours.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        hours.into_iter().take(n).map(|(hour, _)| hour).collect()
    }
}

/// A ranked intervention for a stuck task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StuckActionSuggestion {
    pub action: StuckAction,
    pub id: String,
    pub text: String,
    /// Prior from task priority and stuck duration, in [0, 1].
    pub base_score: f64,
    pub acceptance_rate: f64,
    pub score: f64,
}

/// Nudge policy derived from recent feedback. Not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveNudgeRecommendation {
    pub stuck_threshold_minutes: u32,
    pub daily_nudge_limit: u32,
    /// Grows with sample count only, in [0, 1).
    pub confidence: f64,
    pub acceptance_rate: f64,
    pub sample_count: u64,
}

/// Suggestion activity over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfileMetrics {
    pub window_days: u32,
    pub suggestions_shown: u64,
    pub suggestions_accepted: u64,
    pub suggestions_deferred: u64,
    pub suggestions_rejected: u64,
    /// accepted / shown
    pub hit_rate: f64,
    /// (deferred + rejected) / shown
    pub interruption_index: f64,
    pub top_effective_action_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_ids_roundtrip() {
        for action in StuckAction::ALL {
            assert_eq!(StuckAction::from_id(action.id()), Some(action));
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.id()));
        }
        assert_eq!(StuckAction::from_id("nope"), None);
    }

    #[test]
    fn test_outcome_parse() {
        assert_eq!("Accepted".parse::<FeedbackOutcome>().unwrap(), FeedbackOutcome::Accepted);
        assert_eq!(" defer ".parse::<FeedbackOutcome>().unwrap(), FeedbackOutcome::Deferred);
        assert!("maybe".parse::<FeedbackOutcome>().is_err());
    }

    #[test]
    fn test_reminder_outcome_parse_and_counts() {
        assert_eq!("done".parse::<ReminderOutcome>().unwrap(), ReminderOutcome::Completed);
        assert_eq!(" Snooze ".parse::<ReminderOutcome>().unwrap(), ReminderOutcome::Snoozed);
        assert!("later".parse::<ReminderOutcome>().is_err());

        let mut stats = ReminderStats::default();
        stats.record(ReminderOutcome::Snoozed);
        stats.record(ReminderOutcome::Dismissed);
        stats.record(ReminderOutcome::Completed);
        assert_eq!(stats.responses(), 3);
        assert!(stats.is_avoidance_heavy());
        stats.record(ReminderOutcome::Updated);
        assert!(!stats.is_avoidance_heavy());
    }

    #[test]
    fn test_peak_hours_order() {
        let mut state = UserProfileState::default();
        state.active_hours.extend([(9, 3), (14, 5), (8, 3), (20, 1), (22, 0)]);
        assert_eq!(state.peak_hours(3), vec![14, 8, 9]);
        assert_eq!(state.peak_hours(10).len(), 4);
    }

    #[test]
    fn test_old_state_file_gets_empty_reminders() {
        let state: UserProfileState = serde_json::from_str(r#"{"actions": {}}"#).unwrap();
        assert_eq!(state.reminders, ReminderStats::default());
        assert!(state.active_hours.is_empty());
    }

    #[test]
    fn test_laplace_rate() {
        assert_eq!(ActionStats::default().acceptance_rate(), 0.5);
        let stats = ActionStats {
            shown: 8,
            accepted: 8,
            ..ActionStats::default()
        };
        assert_eq!(stats.acceptance_rate(), 0.9);
    }
}
