//! Weekly review reports.
//!
//! One report per ISO calendar week, keyed `YYYY-Www`, stored as a JSON and
//! a Markdown file under `strategy/weekly_reviews/`. Regenerating a week
//! overwrites the same pair, so a period never has more than one report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::decision::TaskDecisionScore;
use crate::error::Result;
use crate::life_profile::LifeProfileSnapshot;
use crate::scoring::days_before;
use crate::storage::{read_json, write_atomic, write_json_atomic, ReviewConfig, StorageRoot};
use crate::task::{LongTermGoal, TaskRecord};

const REVIEWS_DIR: &str = "weekly_reviews";

/// Per-goal paragraph of the review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalCommentary {
    pub goal_id: String,
    pub goal_description: String,
    pub active_tasks: usize,
    pub stalled_tasks: usize,
    /// 1-based position of the goal's best task in the ranking.
    pub best_rank: Option<usize>,
    pub commentary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReviewReport {
    pub week_key: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub active_task_count: usize,
    pub completed_this_week: usize,
    pub created_this_week: usize,
    pub stalled_task_count: usize,
    pub goal_linked_active_count: usize,
    pub stalled_tasks: Vec<String>,
    pub wins: Vec<String>,
    pub risks: Vec<String>,
    pub next_week_strategy: Vec<String>,
    pub goal_commentary: Vec<GoalCommentary>,
    pub top_focus_tasks: Vec<TaskDecisionScore>,
    pub summary: String,
}

/// Result of [`WeeklyReviewEngine::generate_and_persist`].
#[derive(Debug, Clone)]
pub struct WeeklyReviewOutcome {
    pub report: WeeklyReviewReport,
    /// False when an existing report for the week was returned unchanged.
    pub generated: bool,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct WeeklyReviewEngine {
    dir: PathBuf,
    config: ReviewConfig,
}

impl WeeklyReviewEngine {
    pub fn new(root: &StorageRoot) -> Self {
        Self {
            dir: root.strategy_dir().join(REVIEWS_DIR),
            config: ReviewConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReviewConfig) -> Self {
        self.config = config;
        self
    }

    pub fn reviews_dir(&self) -> &Path {
        &self.dir
    }

    /// `(json, markdown)` paths for a week key.
    pub fn paths_for(&self, week_key: &str) -> (PathBuf, PathBuf) {
        (
            self.dir.join(format!("weekly_review_{week_key}.json")),
            self.dir.join(format!("weekly_review_{week_key}.md")),
        )
    }

    /// Review the calendar week containing `now`.
    ///
    /// Without `force`, a week that already has both files is not
    /// regenerated and the stored report is returned. The Markdown is
    /// written first, so a stored JSON always has its Markdown beside it.
    pub fn generate_and_persist(
        &self,
        tasks: &[TaskRecord],
        goals: &[LongTermGoal],
        life_profile: &LifeProfileSnapshot,
        ranked: &[TaskDecisionScore],
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<WeeklyReviewOutcome> {
        let week_key = week_key(now.date_naive());
        let (json_path, markdown_path) = self.paths_for(&week_key);

        if !force && markdown_path.exists() {
            if let Some(report) = read_json::<WeeklyReviewReport>(&json_path)? {
                debug!(week = %week_key, "weekly review exists, skipping regeneration");
                return Ok(WeeklyReviewOutcome {
                    report,
                    generated: false,
                    json_path,
                    markdown_path,
                });
            }
        }

        let report = self.build(tasks, goals, life_profile, ranked, now, week_key);
        write_atomic(&markdown_path, render_markdown(&report).as_bytes())?;
        write_json_atomic(&json_path, &report)?;
        info!(week = %report.week_key, path = %json_path.display(), "persisted weekly review");

        Ok(WeeklyReviewOutcome {
            report,
            generated: true,
            json_path,
            markdown_path,
        })
    }

    fn build(
        &self,
        tasks: &[TaskRecord],
        goals: &[LongTermGoal],
        profile: &LifeProfileSnapshot,
        ranked: &[TaskDecisionScore],
        now: DateTime<Utc>,
        week_key: String,
    ) -> WeeklyReviewReport {
        let (week_start, week_end) = week_bounds(now.date_naive());
        let period_start = week_start.and_time(NaiveTime::MIN).and_utc();
        let period_end = period_start + Duration::days(7);
        let in_week = |at: DateTime<Utc>| at >= period_start && at < period_end;
        let stalled_cutoff = days_before(now, self.config.stalled_after_days);

        let active: Vec<&TaskRecord> = tasks.iter().filter(|t| t.is_active()).collect();
        let completed_this_week = tasks
            .iter()
            .filter(|t| !t.is_active() && in_week(t.last_modified_at()))
            .count();
        let created_this_week = tasks.iter().filter(|t| in_week(t.created_at())).count();
        let stalled: Vec<&TaskRecord> = active
            .iter()
            .copied()
            .filter(|t| t.progress_reference() < stalled_cutoff)
            .collect();
        let goal_linked = active
            .iter()
            .filter(|t| t.long_term_goal_id().is_some())
            .count();

        let active_count = active.len();
        let wins = wins(completed_this_week, goal_linked, active_count, profile);
        let risks = risks(stalled.len(), goal_linked, active_count, profile);
        let next_week_strategy = next_week_strategy(ranked, stalled.len(), goal_linked, active_count);
        let goal_commentary = goal_commentary(goals, &active, &stalled, ranked);
        let top_focus_tasks: Vec<TaskDecisionScore> =
            ranked.iter().take(self.config.top_focus_count).cloned().collect();

        let mut summary = format!(
            "Week {week_key}: {completed_this_week} completed, {created_this_week} created, {} stalled of {active_count} active tasks.",
            stalled.len()
        );
        let tracked_goals = goal_commentary.len();
        if tracked_goals > 0 {
            let covered = goal_commentary.iter().filter(|g| g.active_tasks > 0).count();
            let _ = write!(summary, " {covered} of {tracked_goals} active goals have work in flight.");
        }
        if let Some(top) = top_focus_tasks.first() {
            let _ = write!(summary, " Top focus: {}.", top.task_name);
        }

        WeeklyReviewReport {
            week_key,
            week_start,
            week_end,
            generated_at: now,
            active_task_count: active_count,
            completed_this_week,
            created_this_week,
            stalled_task_count: stalled.len(),
            goal_linked_active_count: goal_linked,
            stalled_tasks: stalled.iter().map(|t| t.display_name().to_string()).collect(),
            wins,
            risks,
            next_week_strategy,
            goal_commentary,
            top_focus_tasks,
            summary,
        }
    }
}

/// ISO week key such as `2025-W03`. Late-December dates can belong to the
/// next ISO year.
pub fn week_key(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Monday and Sunday of the ISO week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = i64::from(date.weekday().num_days_from_monday());
    let start = date - Duration::days(offset);
    debug_assert_eq!(start.weekday(), Weekday::Mon);
    (start, start + Duration::days(6))
}

fn wins(
    completed: usize,
    goal_linked: usize,
    active: usize,
    profile: &LifeProfileSnapshot,
) -> Vec<String> {
    let mut wins = Vec::new();
    if completed >= 5 {
        wins.push("Steady completion count this week; execution momentum is good.".to_string());
    }
    if active > 0 && goal_linked >= (active / 2).max(2) {
        wins.push("Most active tasks are linked to long-term goals.".to_string());
    }
    if profile.execution_reliability() >= 0.65 {
        wins.push("Reminder history shows high execution reliability.".to_string());
    }
    if wins.is_empty() {
        wins.push("Execution kept going; raise the share of key tasks next week.".to_string());
    }
    wins
}

fn risks(
    stalled: usize,
    goal_linked: usize,
    active: usize,
    profile: &LifeProfileSnapshot,
) -> Vec<String> {
    let mut risks = Vec::new();
    if stalled > 0 && stalled >= (active / 2).max(2) {
        risks.push("A large share of tasks is stalled; split or drop them quickly.".to_string());
    }
    if active > 0 && goal_linked < (active / 3).max(1) {
        risks.push("Few tasks serve long-term goals; short-term work is taking over.".to_string());
    }
    if profile.interruption_sensitivity() >= 0.55 {
        risks.push("Interruption sensitivity is high; cut ad-hoc reminders.".to_string());
    }
    if risks.is_empty() {
        risks.push("Overall risk is under control; keep the current pace.".to_string());
    }
    risks
}

fn next_week_strategy(
    ranked: &[TaskDecisionScore],
    stalled: usize,
    goal_linked: usize,
    active: usize,
) -> Vec<String> {
    let mut plan = Vec::new();
    if !ranked.is_empty() {
        let names: Vec<&str> = ranked.iter().take(3).map(|s| s.task_name.as_str()).collect();
        plan.push(format!("Push the top items first: {}", names.join(", ")));
    }
    plan.push(if stalled > 0 {
        "Define one 30-minute executable step for every stalled task.".to_string()
    } else {
        "Keep high-value tasks moving without gaps.".to_string()
    });
    plan.push(if goal_linked < (active / 3).max(1) {
        "Add at least one key task tied to a long-term goal.".to_string()
    } else {
        "Keep planning the week around long-term goals.".to_string()
    });
    plan
}

fn goal_commentary(
    goals: &[LongTermGoal],
    active: &[&TaskRecord],
    stalled: &[&TaskRecord],
    ranked: &[TaskDecisionScore],
) -> Vec<GoalCommentary> {
    let linked_to = |goal: &LongTermGoal, task: &TaskRecord| {
        task.long_term_goal_id().is_some_and(|id| goal.matches_id(id))
    };

    goals
        .iter()
        .filter(|g| g.active)
        .map(|goal| {
            let active_tasks = active.iter().filter(|&&t| linked_to(goal, t)).count();
            let stalled_tasks = stalled.iter().filter(|&&t| linked_to(goal, t)).count();
            let best = ranked.iter().enumerate().find(|(_, score)| {
                score.goal_id.as_deref().is_some_and(|id| goal.matches_id(id))
            });

            let mut commentary = match (active_tasks, best) {
                (0, _) => format!(
                    "{}: no active tasks; add one concrete next step.",
                    goal.description
                ),
                (n, Some((pos, score))) => format!(
                    "{}: {n} active task(s), best ranked #{} ({}, score {:.2}).",
                    goal.description,
                    pos + 1,
                    score.task_name,
                    score.score
                ),
                (n, None) => format!("{}: {n} active task(s), none in the current ranking.", goal.description),
            };
            if stalled_tasks > 0 {
                let _ = write!(commentary, " {stalled_tasks} stalled.");
            }

            GoalCommentary {
                goal_id: goal.id.clone(),
                goal_description: goal.description.clone(),
                active_tasks,
                stalled_tasks,
                best_rank: best.map(|(pos, _)| pos + 1),
                commentary,
            }
        })
        .collect()
}

fn render_markdown(report: &WeeklyReviewReport) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# Weekly Review {}", report.week_key);
    let _ = writeln!(md);
    let _ = writeln!(md, "{}", report.summary);
    let _ = writeln!(md);
    let _ = writeln!(md, "- Period: {} ~ {}", report.week_start, report.week_end);
    let _ = writeln!(md, "- Active tasks: {}", report.active_task_count);
    let _ = writeln!(md, "- Completed this week: {}", report.completed_this_week);
    let _ = writeln!(md, "- Created this week: {}", report.created_this_week);
    let _ = writeln!(md, "- Stalled tasks: {}", report.stalled_task_count);
    let _ = writeln!(md, "- Goal-linked active tasks: {}", report.goal_linked_active_count);

    let sections: [(&str, &[String]); 3] = [
        ("Wins", &report.wins),
        ("Risks", &report.risks),
        ("Next Week", &report.next_week_strategy),
    ];
    for (title, items) in sections {
        let _ = writeln!(md);
        let _ = writeln!(md, "## {title}");
        for item in items {
            let _ = writeln!(md, "- {item}");
        }
    }

    let _ = writeln!(md);
    let _ = writeln!(md, "## Focus Tasks");
    for task in &report.top_focus_tasks {
        let _ = writeln!(md, "- {} (score {:.2})", task.task_name, task.score);
    }

    if !report.goal_commentary.is_empty() {
        let _ = writeln!(md);
        let _ = writeln!(md, "## Goals");
        for goal in &report.goal_commentary {
            let _ = writeln!(md, "- {}", goal.commentary);
        }
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_week_key_uses_iso_year() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(week_key(date), "2025-W01");
        let date = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        assert_eq!(week_key(date), "2025-W11");
    }

    #[test]
    fn test_week_bounds_start_monday() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap(); // Sunday
        let (start, end) = week_bounds(date);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(end, date);
    }

    #[test]
    fn test_commentary_references_ranking() {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
        let goal = LongTermGoal::new("Ship v2", "").with_id("g").activated();
        let task = TaskRecord::new("Write spec").with_goal("g").with_created_at(now);
        let active = vec![&task];
        let ranked = vec![TaskDecisionScore {
            task_name: "Write spec".into(),
            goal_id: Some("g".into()),
            importance: task.importance(),
            urgency: task.urgency(),
            quadrant: task.quadrant(),
            score: 0.5,
            importance_multiplier: 1.0,
            breakdown: Default::default(),
            reasons: vec![],
        }];
        let notes = goal_commentary(&[goal], &active, &[], &ranked);
        assert_eq!(notes[0].best_rank, Some(1));
        assert!(notes[0].commentary.contains("#1"));
    }

    #[test]
    fn test_goals_section_lists_commentary_per_active_goal() {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let engine = WeeklyReviewEngine::new(&StorageRoot::new(dir.path()).unwrap());
        let goals = vec![
            LongTermGoal::new("Ship v2", "").with_id("g").activated(),
            LongTermGoal::new("Paused goal", "").with_id("p"),
        ];
        let report = engine.build(&[], &goals, &LifeProfileSnapshot::default(), &[], now, week_key(now.date_naive()));
        let md = render_markdown(&report);
        assert!(md.contains("## Goals\n- Ship v2: no active tasks"));
        assert!(!md.contains("Paused goal"));

        let none = engine.build(&[], &[], &LifeProfileSnapshot::default(), &[], now, week_key(now.date_naive()));
        assert!(!render_markdown(&none).contains("## Goals"));
    }

    #[test]
    fn test_huge_stalled_threshold_marks_nothing_stalled() {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let config = ReviewConfig {
            stalled_after_days: u32::MAX,
            ..ReviewConfig::default()
        };
        let engine = WeeklyReviewEngine::new(&StorageRoot::new(dir.path()).unwrap()).with_config(config);
        let tasks = vec![TaskRecord::new("old").with_created_at(now - Duration::days(400))];
        let outcome = engine
            .generate_and_persist(&tasks, &[], &LifeProfileSnapshot::default(), &[], now, false)
            .unwrap();
        assert_eq!(outcome.report.stalled_task_count, 0);
    }
}
