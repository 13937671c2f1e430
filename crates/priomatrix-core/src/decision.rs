//! Weighted multi-factor task ranking.
//!
//! Every active task gets five raw terms in [0, 1]: long-term goal linkage,
//! urgency, strength fit, energy fit and a staleness risk. The weighted
//! positive terms minus the weighted risk are scaled by an importance
//! multiplier:
//!
//! ```text
//! score = importance_multiplier * (Σ w_i * term_i - w_risk * risk)
//! ```
//!
//! Default weights favor goal-linked work; raising `urgency_weight` far
//! enough promotes time-critical tasks above it.

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::life_profile::LifeProfileSnapshot;
use crate::scoring::{
    infer_skill_tags, round4, sanitize_weight, staleness, ObjectiveTerm, ScoreBreakdown,
};
use crate::storage::{write_json_atomic, StorageRoot};
use crate::task::{PriorityLevel, Quadrant, TaskRecord};

const SNAPSHOT_FILE: &str = "decision_focus_snapshot.json";

/// Staleness decay constant in days.
const RISK_SCALE_DAYS: f64 = 7.0;
/// Credit given to the energy term outside peak hours.
const OFF_PEAK_ENERGY: f64 = 0.5;
/// Extra raw risk for urgent, goal-less work when the user flags urgency overload.
const URGENCY_OVERLOAD_RISK: f64 = 0.25;
const STALLED_REASON_DAYS: i64 = 3;

pub const TERM_LONG_TERM: &str = "long_term";
pub const TERM_URGENCY: &str = "urgency";
pub const TERM_STRENGTH_FIT: &str = "strength_fit";
pub const TERM_ENERGY_FIT: &str = "energy_fit";
pub const TERM_RISK: &str = "risk_penalty";

/// Ranking weights. Negative or non-finite weights count as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEngineOptions {
    #[serde(default = "default_long_term_weight")]
    pub long_term_weight: f64,
    #[serde(default = "default_urgency_weight")]
    pub urgency_weight: f64,
    #[serde(default = "default_strength_fit_weight")]
    pub strength_fit_weight: f64,
    #[serde(default = "default_energy_fit_weight")]
    pub energy_fit_weight: f64,
    #[serde(default = "default_risk_penalty_weight")]
    pub risk_penalty_weight: f64,
    /// Entries kept in the persisted focus snapshot.
    #[serde(default = "default_snapshot_top_count")]
    pub snapshot_top_count: usize,
}

fn default_long_term_weight() -> f64 {
    0.45
}
fn default_urgency_weight() -> f64 {
    0.35
}
fn default_strength_fit_weight() -> f64 {
    0.15
}
fn default_energy_fit_weight() -> f64 {
    0.12
}
fn default_risk_penalty_weight() -> f64 {
    0.10
}
fn default_snapshot_top_count() -> usize {
    5
}

impl Default for DecisionEngineOptions {
    fn default() -> Self {
        Self {
            long_term_weight: default_long_term_weight(),
            urgency_weight: default_urgency_weight(),
            strength_fit_weight: default_strength_fit_weight(),
            energy_fit_weight: default_energy_fit_weight(),
            risk_penalty_weight: default_risk_penalty_weight(),
            snapshot_top_count: default_snapshot_top_count(),
        }
    }
}

impl DecisionEngineOptions {
    /// Weights keyed by their config field names.
    pub fn named_weights(&self) -> [(&'static str, f64); 5] {
        [
            ("long_term_weight", self.long_term_weight),
            ("urgency_weight", self.urgency_weight),
            ("strength_fit_weight", self.strength_fit_weight),
            ("energy_fit_weight", self.energy_fit_weight),
            ("risk_penalty_weight", self.risk_penalty_weight),
        ]
    }

    /// Copy with invalid weights replaced by zero and a snapshot of at least one.
    pub fn sanitized(&self) -> Self {
        Self {
            long_term_weight: sanitize_weight(self.long_term_weight),
            urgency_weight: sanitize_weight(self.urgency_weight),
            strength_fit_weight: sanitize_weight(self.strength_fit_weight),
            energy_fit_weight: sanitize_weight(self.energy_fit_weight),
            risk_penalty_weight: sanitize_weight(self.risk_penalty_weight),
            snapshot_top_count: self.snapshot_top_count.max(1),
        }
    }
}

/// Score of one task with its explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDecisionScore {
    pub task_name: String,
    pub goal_id: Option<String>,
    pub importance: PriorityLevel,
    pub urgency: PriorityLevel,
    pub quadrant: Quadrant,
    /// Final score, rounded to four decimals.
    pub score: f64,
    pub importance_multiplier: f64,
    /// Weighted terms before the importance multiplier.
    pub breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
}

#[derive(Serialize)]
struct FocusSnapshot<'a> {
    generated_at: DateTime<Utc>,
    top: &'a [TaskDecisionScore],
}

/// Ranks active tasks. Pure apart from [`persist_snapshot`](Self::persist_snapshot).
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    root: StorageRoot,
    options: DecisionEngineOptions,
}

impl DecisionEngine {
    pub fn new(root: StorageRoot, options: DecisionEngineOptions) -> Self {
        Self {
            root,
            options: options.sanitized(),
        }
    }

    pub fn options(&self) -> &DecisionEngineOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DecisionEngineOptions) {
        self.options = options.sanitized();
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root.strategy_dir().join(SNAPSHOT_FILE)
    }

    /// One score per active task, highest first. Equal scores keep input order.
    ///
    /// `now` supplies both the reference time for staleness and the hour of
    /// day matched against peak hours, in whatever zone it carries.
    pub fn rank_tasks<Tz: TimeZone>(
        &self,
        tasks: &[TaskRecord],
        life_profile: &LifeProfileSnapshot,
        focus_goal_id: Option<&str>,
        now: DateTime<Tz>,
    ) -> Vec<TaskDecisionScore> {
        let hour = now.hour();
        let now = now.with_timezone(&Utc);
        let focus_goal_id = focus_goal_id.map(str::trim).filter(|id| !id.is_empty());

        let mut ranked: Vec<TaskDecisionScore> = tasks
            .iter()
            .filter(|task| task.is_active())
            .map(|task| self.score_task(task, life_profile, focus_goal_id, hour, now))
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(
            ranked = ranked.len(),
            skipped = tasks.len() - ranked.len(),
            "ranked tasks"
        );
        ranked
    }

    fn score_task(
        &self,
        task: &TaskRecord,
        profile: &LifeProfileSnapshot,
        focus_goal_id: Option<&str>,
        hour: u32,
        now: DateTime<Utc>,
    ) -> TaskDecisionScore {
        let opts = &self.options;
        let goal_id = task.long_term_goal_id();

        let on_focus = matches!(
            (goal_id, focus_goal_id),
            (Some(goal), Some(focus)) if goal.eq_ignore_ascii_case(focus)
        );
        let long_term = if on_focus { 1.0 } else { 0.0 };

        let urgency = task.urgency().normalized();

        let tags = infer_skill_tags(task);
        let matched_strength = tags.iter().find(|tag| profile.has_strength(tag)).cloned();
        let strength_fit = if matched_strength.is_some() { 1.0 } else { 0.0 };

        let in_peak = profile.is_peak_hour(hour);
        let energy_fit = if in_peak { 1.0 } else { OFF_PEAK_ENERGY };

        let idle = now.signed_duration_since(task.progress_reference());
        let idle_days = idle.num_seconds() as f64 / 86_400.0;
        let mut risk = staleness(idle_days, RISK_SCALE_DAYS);
        if goal_id.is_none()
            && task.urgency().is_high()
            && profile.has_risk_trigger("urgency_overload")
        {
            risk = (risk + URGENCY_OVERLOAD_RISK).min(1.0);
        }

        let mut breakdown = ScoreBreakdown::new();
        breakdown.add_term(ObjectiveTerm::reward(TERM_LONG_TERM, opts.long_term_weight, long_term));
        breakdown.add_term(ObjectiveTerm::reward(TERM_URGENCY, opts.urgency_weight, urgency));
        breakdown.add_term(ObjectiveTerm::reward(
            TERM_STRENGTH_FIT,
            opts.strength_fit_weight,
            strength_fit,
        ));
        breakdown.add_term(ObjectiveTerm::reward(TERM_ENERGY_FIT, opts.energy_fit_weight, energy_fit));
        breakdown.add_term(ObjectiveTerm::penalty(TERM_RISK, opts.risk_penalty_weight, risk));

        let multiplier = importance_multiplier(task.importance());
        let score = round4(multiplier * breakdown.total);

        let mut reasons = Vec::new();
        if on_focus {
            reasons.push("Linked to the focus goal".to_string());
        } else if goal_id.is_some() {
            reasons.push("Linked to a long-term goal".to_string());
        }
        match (task.importance().is_high(), task.urgency().is_high()) {
            (true, true) => reasons.push("Important and urgent".to_string()),
            (true, false) => reasons.push("High importance".to_string()),
            (false, true) => reasons.push("High urgency".to_string()),
            (false, false) => {}
        }
        if let Some(tag) = matched_strength {
            reasons.push(format!("Plays to the '{tag}' strength"));
        }
        if in_peak {
            reasons.push("Inside a peak-energy hour".to_string());
        }
        if idle.num_days() >= STALLED_REASON_DAYS {
            reasons.push(format!("No progress for {} days", idle.num_days()));
        }

        TaskDecisionScore {
            task_name: task.display_name().to_string(),
            goal_id: goal_id.map(str::to_string),
            importance: task.importance(),
            urgency: task.urgency(),
            quadrant: task.quadrant(),
            score,
            importance_multiplier: multiplier,
            breakdown,
            reasons,
        }
    }

    /// One-line summary naming the top `top_n` tasks (at least one).
    pub fn build_focus_brief(&self, ranked: &[TaskDecisionScore], top_n: usize) -> String {
        if ranked.is_empty() {
            return "No active tasks to focus on right now.".to_string();
        }
        let names: Vec<&str> = ranked
            .iter()
            .take(top_n.max(1))
            .map(|s| s.task_name.as_str())
            .collect();
        format!("Focus this cycle: {}", names.join(", "))
    }

    /// Write the top `snapshot_top_count` entries to
    /// `strategy/decision_focus_snapshot.json`, replacing the previous one.
    pub fn persist_snapshot(
        &self,
        ranked: &[TaskDecisionScore],
        now: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let keep = self.options.snapshot_top_count.min(ranked.len());
        let snapshot = FocusSnapshot {
            generated_at: now,
            top: &ranked[..keep],
        };
        let path = self.snapshot_path();
        write_json_atomic(&path, &snapshot)?;
        info!(path = %path.display(), entries = keep, "persisted focus snapshot");
        Ok(path)
    }
}

/// High 1.25, Low 0.75, Unknown 1.0; legacy values interpolate 0.75..=1.25.
pub fn importance_multiplier(importance: PriorityLevel) -> f64 {
    match importance {
        PriorityLevel::High => 1.25,
        PriorityLevel::Low => 0.75,
        PriorityLevel::Unknown => 1.0,
        PriorityLevel::Legacy(_) => 0.75 + 0.5 * importance.normalized(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;
    use PriorityLevel::{High, Low, Unknown};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 12, 10, 0, 0).unwrap()
    }

    fn engine(dir: &TempDir, options: DecisionEngineOptions) -> DecisionEngine {
        DecisionEngine::new(StorageRoot::new(dir.path()).unwrap(), options)
    }

    fn task(name: &str, importance: PriorityLevel, urgency: PriorityLevel) -> TaskRecord {
        TaskRecord::new(name)
            .with_priority(importance, urgency)
            .with_created_at(now() - Duration::days(1))
    }

    #[test]
    fn test_inactive_tasks_are_excluded() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir, DecisionEngineOptions::default());
        let tasks = vec![
            task("a", High, High),
            task("b", Low, Low).with_active(false),
            task("c", Unknown, Unknown),
        ];
        let ranked = engine.rank_tasks(&tasks, &LifeProfileSnapshot::default(), None, now());
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|s| s.task_name != "b"));
    }

    #[test]
    fn test_default_weights_favor_goal_linkage() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir, DecisionEngineOptions::default());
        let tasks = vec![
            task("urgent", High, High),
            task("goal work", High, Low).with_goal("g1"),
        ];
        let ranked = engine.rank_tasks(&tasks, &LifeProfileSnapshot::default(), Some("G1"), now());
        assert_eq!(ranked[0].task_name, "goal work");
        assert_eq!(ranked[0].reasons[0], "Linked to the focus goal");
    }

    #[test]
    fn test_urgency_weight_can_override_goal_linkage() {
        let dir = TempDir::new().unwrap();
        let options = DecisionEngineOptions {
            long_term_weight: 0.1,
            urgency_weight: 1.2,
            strength_fit_weight: 1.0,
            energy_fit_weight: 1.0,
            risk_penalty_weight: 1.0,
            snapshot_top_count: 5,
        };
        let engine = engine(&dir, options);
        let tasks = vec![
            task("goal work", High, Low).with_goal("g1"),
            task("urgent", High, High),
        ];
        let ranked = engine.rank_tasks(&tasks, &LifeProfileSnapshot::default(), Some("g1"), now());
        assert_eq!(ranked[0].task_name, "urgent");
    }

    #[test]
    fn test_malformed_levels_score_neutral() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir, DecisionEngineOptions::default());
        let tasks = vec![task("odd", PriorityLevel::parse("Medium"), PriorityLevel::parse("??"))];
        let ranked = engine.rank_tasks(&tasks, &LifeProfileSnapshot::default(), None, now());
        let urgency = ranked[0].breakdown.term(TERM_URGENCY).unwrap();
        assert_eq!(urgency.value, 0.5);
        assert_eq!(ranked[0].importance_multiplier, 1.0);
        assert!(ranked[0].score.is_finite());
    }

    #[test]
    fn test_peak_hour_and_strength_fit() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir, DecisionEngineOptions::default());
        let profile = LifeProfileSnapshot::default()
            .with_strengths(["writing"])
            .with_peak_hours([10]);
        let tasks = vec![task("Write the launch blog post", Unknown, Unknown)];
        let ranked = engine.rank_tasks(&tasks, &profile, None, now());
        let breakdown = &ranked[0].breakdown;
        assert_eq!(breakdown.term(TERM_STRENGTH_FIT).unwrap().value, 1.0);
        assert_eq!(breakdown.term(TERM_ENERGY_FIT).unwrap().value, 1.0);

        let off_peak = engine.rank_tasks(&tasks, &profile, None, now() + Duration::hours(5));
        assert_eq!(off_peak[0].breakdown.term(TERM_ENERGY_FIT).unwrap().value, 0.5);
    }

    #[test]
    fn test_stale_tasks_are_penalized() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir, DecisionEngineOptions::default());
        let fresh = task("fresh", High, Low).with_last_progress_at(now());
        let stale = task("stale", High, Low).with_last_progress_at(now() - Duration::days(14));
        let future = task("future", High, Low).with_last_progress_at(now() + Duration::days(2));
        let ranked = engine.rank_tasks(
            &[stale, fresh, future],
            &LifeProfileSnapshot::default(),
            None,
            now(),
        );
        assert_eq!(ranked[2].task_name, "stale");
        assert_eq!(ranked[0].breakdown.term(TERM_RISK).unwrap().value, 0.0);
        assert!(ranked[2].reasons.iter().any(|r| r.contains("14 days")));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir, DecisionEngineOptions::default());
        let tasks = vec![task("first", Low, Low), task("second", Low, Low)];
        let ranked = engine.rank_tasks(&tasks, &LifeProfileSnapshot::default(), None, now());
        assert_eq!(ranked[0].score, ranked[1].score);
        assert_eq!(ranked[0].task_name, "first");
    }

    #[test]
    fn test_invalid_weights_count_as_zero() {
        let options = DecisionEngineOptions {
            urgency_weight: -3.0,
            risk_penalty_weight: f64::NAN,
            snapshot_top_count: 0,
            ..DecisionEngineOptions::default()
        }
        .sanitized();
        assert_eq!(options.urgency_weight, 0.0);
        assert_eq!(options.risk_penalty_weight, 0.0);
        assert_eq!(options.snapshot_top_count, 1);
    }

    #[test]
    fn test_focus_brief() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir, DecisionEngineOptions::default());
        assert!(engine.build_focus_brief(&[], 3).starts_with("No active tasks"));

        let tasks = vec![task("a", High, High), task("b", High, Low), task("c", Low, Low)];
        let ranked = engine.rank_tasks(&tasks, &LifeProfileSnapshot::default(), None, now());
        assert_eq!(engine.build_focus_brief(&ranked, 2), "Focus this cycle: a, b");
        assert_eq!(engine.build_focus_brief(&ranked, 0), "Focus this cycle: a");
    }

    #[test]
    fn test_persist_snapshot_caps_entries() {
        let dir = TempDir::new().unwrap();
        let options = DecisionEngineOptions {
            snapshot_top_count: 2,
            ..DecisionEngineOptions::default()
        };
        let engine = engine(&dir, options);
        let tasks = vec![task("a", High, High), task("b", High, Low), task("c", Low, Low)];
        let ranked = engine.rank_tasks(&tasks, &LifeProfileSnapshot::default(), None, now());

        let path = engine.persist_snapshot(&ranked, now()).unwrap();
        assert_eq!(path, dir.path().join("strategy").join("decision_focus_snapshot.json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["top"].as_array().unwrap().len(), 2);
        assert_eq!(json["top"][0]["task_name"], "a");
    }
}
