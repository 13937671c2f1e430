//! Goal → task hierarchy snapshot.
//!
//! A point-in-time view of every active goal with the active tasks that
//! reference it, written to `strategy/goal_hierarchy.json` and overwritten
//! on each build.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::storage::{write_json_atomic, StorageRoot};
use crate::task::{LongTermGoal, PriorityLevel, TaskRecord};

const HIERARCHY_FILE: &str = "goal_hierarchy.json";

const WEEKLY_COMMITMENTS: usize = 5;
const MAX_THEMES: usize = 4;
/// Day offset assumed for unscheduled tasks when bucketing milestones.
const UNSCHEDULED_MILESTONE_DAY: u32 = 90;

/// A task as listed under its goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalTaskEntry {
    pub description: String,
    pub scheduled_day: Option<u32>,
    pub importance: PriorityLevel,
    pub urgency: PriorityLevel,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalHierarchyItem {
    pub goal_id: String,
    pub goal_description: String,
    /// Declared duration as written by the user.
    pub total_duration: String,
    pub duration_days: u32,
    pub time_horizon: String,
    /// Linked active tasks, by scheduled day then creation time.
    pub tasks: Vec<GoalTaskEntry>,
    pub yearly_themes: Vec<String>,
    pub quarterly_milestones: Vec<String>,
    pub weekly_commitments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalHierarchySnapshot {
    pub generated_at: DateTime<Utc>,
    pub goals: Vec<GoalHierarchyItem>,
}

/// Builds and persists [`GoalHierarchySnapshot`]s.
#[derive(Debug, Clone)]
pub struct GoalHierarchyEngine {
    path: PathBuf,
}

impl GoalHierarchyEngine {
    pub fn new(root: &StorageRoot) -> Self {
        Self {
            path: root.strategy_dir().join(HIERARCHY_FILE),
        }
    }

    pub fn snapshot_path(&self) -> &PathBuf {
        &self.path
    }

    /// Build the hierarchy and overwrite the snapshot file.
    pub fn build_and_persist(
        &self,
        goals: &[LongTermGoal],
        tasks: &[TaskRecord],
        now: DateTime<Utc>,
    ) -> Result<GoalHierarchySnapshot> {
        let snapshot = build(goals, tasks, now);
        write_json_atomic(&self.path, &snapshot)?;
        info!(
            path = %self.path.display(),
            goals = snapshot.goals.len(),
            "persisted goal hierarchy"
        );
        Ok(snapshot)
    }
}

/// Build without persisting.
pub fn build(goals: &[LongTermGoal], tasks: &[TaskRecord], now: DateTime<Utc>) -> GoalHierarchySnapshot {
    let goals = goals
        .iter()
        .filter(|goal| goal.active)
        .map(|goal| build_item(goal, tasks))
        .collect();
    GoalHierarchySnapshot {
        generated_at: now,
        goals,
    }
}

fn build_item(goal: &LongTermGoal, tasks: &[TaskRecord]) -> GoalHierarchyItem {
    let mut related: Vec<&TaskRecord> = tasks
        .iter()
        .filter(|task| task.is_active())
        .filter(|task| task.long_term_goal_id().is_some_and(|id| goal.matches_id(id)))
        .collect();
    related.sort_by_key(|task| (task.original_scheduled_day().unwrap_or(u32::MAX), task.created_at()));
    debug!(goal = %goal.id, tasks = related.len(), "collected goal tasks");

    let duration_days = goal.duration_days();
    let mut weekly_commitments: Vec<String> = Vec::new();
    for task in related.iter().take(WEEKLY_COMMITMENTS) {
        let name = task.description().trim();
        if !name.is_empty() && !weekly_commitments.iter().any(|c| c == name) {
            weekly_commitments.push(name.to_string());
        }
    }

    GoalHierarchyItem {
        goal_id: goal.id.clone(),
        goal_description: goal.description.clone(),
        total_duration: goal.total_duration.clone(),
        duration_days,
        time_horizon: time_horizon(duration_days).to_string(),
        tasks: related
            .iter()
            .map(|task| GoalTaskEntry {
                description: task.display_name().to_string(),
                scheduled_day: task.original_scheduled_day(),
                importance: task.importance(),
                urgency: task.urgency(),
                created_at: task.created_at(),
            })
            .collect(),
        yearly_themes: yearly_themes(goal, &related),
        quarterly_milestones: quarterly_milestones(&related),
        weekly_commitments,
    }
}

/// Horizon bucket for a duration in days.
pub fn time_horizon(duration_days: u32) -> &'static str {
    match duration_days {
        0..=120 => "within 1 year",
        121..=365 => "1-3 years",
        _ => "3+ years",
    }
}

fn yearly_themes(goal: &LongTermGoal, related: &[&TaskRecord]) -> Vec<String> {
    let mut themes = Vec::new();
    if goal.is_learning_plan {
        themes.push("Capability building and systematic learning".to_string());
    }

    let high_importance = related.iter().filter(|t| t.importance().is_high()).count();
    if !related.is_empty() && high_importance >= (related.len() / 2).max(1) {
        themes.push("Push high-value tasks first".to_string());
    }

    for word in top_words(related, 2) {
        themes.push(format!("Keep deepening \"{word}\""));
    }

    if themes.is_empty() {
        themes.push("Focus on the core goal and keep hitting key milestones".to_string());
    }
    themes.dedup();
    themes.truncate(MAX_THEMES);
    themes
}

/// Most frequent words of two or more characters, first occurrence wins ties.
fn top_words(related: &[&TaskRecord], n: usize) -> Vec<String> {
    const SEPARATORS: &[char] = &[' ', ',', '，', '。', ';', '；', '-', '_', '/', '\\'];

    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0;
    for word in related
        .iter()
        .flat_map(|t| t.description().split(SEPARATORS))
        .filter(|w| w.chars().count() >= 2)
    {
        let entry = counts.entry(word.to_lowercase()).or_insert((0, order));
        entry.0 += 1;
        order += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by_key(|(_, (count, first))| (Reverse(*count), *first));
    ranked.into_iter().take(n).map(|(word, _)| word).collect()
}

/// Quarter (1-4) for a day offset, in 30-day buckets.
pub fn quarter_for_day(day: u32) -> u32 {
    (day.saturating_sub(1) / 30 + 1).clamp(1, 4)
}

fn quarterly_milestones(related: &[&TaskRecord]) -> Vec<String> {
    let mut quarters: [Vec<&str>; 4] = Default::default();
    for task in related {
        let day = task.original_scheduled_day().unwrap_or(UNSCHEDULED_MILESTONE_DAY);
        let name = task.description().trim();
        if !name.is_empty() {
            quarters[(quarter_for_day(day) - 1) as usize].push(name);
        }
    }

    quarters
        .iter()
        .enumerate()
        .filter(|(_, names)| !names.is_empty())
        .map(|(i, names)| {
            let picks: Vec<&str> = names.iter().take(2).copied().collect();
            format!("Q{}: complete {}", i + 1, picks.join(", "))
        })
        .collect()
}
