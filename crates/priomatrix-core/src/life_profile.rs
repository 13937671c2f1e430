//! Life profile snapshot supplied as ranking context.
//!
//! A snapshot is either written by hand or derived by [`LifeProfileEngine`]
//! from reminder history and the current task list, in which case it is
//! kept at `strategy/user_life_profile.json`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::error::Result;
use crate::profile::UserProfileState;
use crate::scoring::{clamp_unit, days_before};
use crate::storage::{read_json, write_json_atomic, StorageRoot};
use crate::task::{Quadrant, TaskRecord};

const LIFE_PROFILE_FILE: &str = "user_life_profile.json";

const PEAK_HOURS: usize = 3;
/// Active tasks without progress for this long count as stuck.
const STUCK_AFTER_DAYS: u32 = 3;
/// Below this many reminder responses the nudge tone stays gentle.
const MIN_TONE_RESPONSES: u64 = 4;

/// How boldly the user tends to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStyle {
    #[default]
    Balanced,
    Decisive,
    Conservative,
}

/// Register reminders should be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeTone {
    #[default]
    Gentle,
    VeryGentle,
    DirectFriendly,
}

/// Strengths, peak-productivity hours and behavior signals.
///
/// Immutable per invocation; engines only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeProfileSnapshot {
    /// Strength tags such as "writing" or "goal_oriented".
    #[serde(default)]
    pub strengths: BTreeSet<String>,
    /// Hours of day (0-23) with the highest energy.
    #[serde(default)]
    pub peak_hours: BTreeSet<u32>,
    /// Known risk triggers such as "urgency_overload".
    #[serde(default)]
    pub risk_triggers: BTreeSet<String>,
    /// Share of reminders answered with progress (0..=1).
    #[serde(default = "neutral")]
    pub execution_reliability: f64,
    /// Share of reminders snoozed or dismissed (0..=1).
    #[serde(default = "neutral")]
    pub interruption_sensitivity: f64,
    /// Set when derived from behavior.
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub decision_style: DecisionStyle,
    #[serde(default)]
    pub recommended_nudge_tone: NudgeTone,
    #[serde(default)]
    pub active_task_count: usize,
    #[serde(default)]
    pub stuck_task_count: usize,
    #[serde(default)]
    pub goal_linked_task_count: usize,
}

fn neutral() -> f64 {
    0.5
}

impl Default for LifeProfileSnapshot {
    fn default() -> Self {
        Self {
            strengths: BTreeSet::new(),
            peak_hours: BTreeSet::new(),
            risk_triggers: BTreeSet::new(),
            execution_reliability: neutral(),
            interruption_sensitivity: neutral(),
            generated_at: None,
            decision_style: DecisionStyle::default(),
            recommended_nudge_tone: NudgeTone::default(),
            active_task_count: 0,
            stuck_task_count: 0,
            goal_linked_task_count: 0,
        }
    }
}

impl LifeProfileSnapshot {
    pub fn with_strengths<I, S>(mut self, strengths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strengths = strengths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_peak_hours<I: IntoIterator<Item = u32>>(mut self, hours: I) -> Self {
        self.peak_hours = hours.into_iter().filter(|h| *h < 24).collect();
        self
    }

    pub fn has_strength(&self, tag: &str) -> bool {
        self.strengths
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(tag.trim()))
    }

    pub fn has_risk_trigger(&self, tag: &str) -> bool {
        self.risk_triggers
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(tag.trim()))
    }

    pub fn is_peak_hour(&self, hour: u32) -> bool {
        self.peak_hours.contains(&hour)
    }

    /// Reliability clamped into [0, 1]; NaN reads as neutral.
    pub fn execution_reliability(&self) -> f64 {
        clamp_unit(self.execution_reliability)
    }

    pub fn interruption_sensitivity(&self) -> f64 {
        clamp_unit(self.interruption_sensitivity)
    }
}

/// Derives [`LifeProfileSnapshot`]s from behavior and keeps the latest one.
#[derive(Debug, Clone)]
pub struct LifeProfileEngine {
    path: PathBuf,
}

impl LifeProfileEngine {
    pub fn new(root: &StorageRoot) -> Self {
        Self {
            path: root.strategy_dir().join(LIFE_PROFILE_FILE),
        }
    }

    pub fn profile_path(&self) -> &Path {
        &self.path
    }

    /// Derive a snapshot and overwrite the stored one.
    pub fn build_and_persist(
        &self,
        behavior: &UserProfileState,
        tasks: &[TaskRecord],
        now: DateTime<Utc>,
    ) -> Result<LifeProfileSnapshot> {
        let snapshot = build(behavior, tasks, now);
        write_json_atomic(&self.path, &snapshot)?;
        info!(
            path = %self.path.display(),
            style = ?snapshot.decision_style,
            "persisted life profile"
        );
        Ok(snapshot)
    }

    /// The stored snapshot, or the neutral one when missing or unreadable.
    pub fn load_or_default(&self) -> LifeProfileSnapshot {
        match read_json(&self.path) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => LifeProfileSnapshot::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable life profile, using neutral");
                LifeProfileSnapshot::default()
            }
        }
    }
}

/// Derive without persisting.
///
/// Without any reminder responses both rates stay at the neutral 0.5.
pub fn build(behavior: &UserProfileState, tasks: &[TaskRecord], now: DateTime<Utc>) -> LifeProfileSnapshot {
    let reminders = &behavior.reminders;
    let responses = reminders.responses();
    let (reliability, sensitivity) = if responses == 0 {
        (neutral(), neutral())
    } else {
        let total = responses as f64;
        (
            clamp_unit(reminders.engaged() as f64 / total),
            clamp_unit(reminders.avoided() as f64 / total),
        )
    };

    let active: Vec<&TaskRecord> = tasks.iter().filter(|t| t.is_active()).collect();
    let active_count = active.len();
    let stuck_cutoff = days_before(now, STUCK_AFTER_DAYS);
    let stuck = active
        .iter()
        .filter(|t| t.progress_reference() < stuck_cutoff)
        .count();
    let goal_linked = active
        .iter()
        .filter(|t| t.long_term_goal_id().is_some())
        .count();
    let urgent_important = active
        .iter()
        .filter(|t| t.quadrant() == Quadrant::ImportantUrgent)
        .count();
    let peak_hours = behavior.peak_hours(PEAK_HOURS);

    let mut strengths = BTreeSet::new();
    if reliability >= 0.65 {
        strengths.insert("consistent_executor".to_string());
    }
    if goal_linked >= (active_count / 3).max(2) {
        strengths.insert("goal_oriented".to_string());
    }
    if urgent_important <= (active_count / 4).max(1) {
        strengths.insert("prioritization_control".to_string());
    }
    if !peak_hours.is_empty() {
        strengths.insert("predictable_energy_rhythm".to_string());
    }

    let mut risk_triggers = BTreeSet::new();
    if sensitivity >= 0.55 {
        risk_triggers.insert("high_interruption_cost".to_string());
    }
    if stuck >= (active_count / 3).max(2) {
        risk_triggers.insert("stuck_backlog".to_string());
    }
    if urgent_important >= (active_count / 2).max(3) {
        risk_triggers.insert("urgency_overload".to_string());
    }

    let decision_style = if reliability >= 0.7 && sensitivity <= 0.3 {
        DecisionStyle::Decisive
    } else if sensitivity >= 0.6 {
        DecisionStyle::Conservative
    } else {
        DecisionStyle::Balanced
    };
    let recommended_nudge_tone = if responses < MIN_TONE_RESPONSES {
        NudgeTone::Gentle
    } else if sensitivity >= 0.55 {
        NudgeTone::VeryGentle
    } else {
        NudgeTone::DirectFriendly
    };

    LifeProfileSnapshot {
        strengths,
        peak_hours: peak_hours.into_iter().collect(),
        risk_triggers,
        execution_reliability: reliability,
        interruption_sensitivity: sensitivity,
        generated_at: Some(now),
        decision_style,
        recommended_nudge_tone,
        active_task_count: active_count,
        stuck_task_count: stuck,
        goal_linked_task_count: goal_linked,
    }
}
