//! Integration tests for task ranking and focus snapshots.

use chrono::{Duration, TimeZone, Utc};
use priomatrix_core::{
    DecisionEngine, DecisionEngineOptions, LifeProfileSnapshot, PriorityLevel, StorageRoot,
    TaskRecord,
};
use proptest::prelude::*;
use tempfile::TempDir;

fn engine(dir: &TempDir) -> DecisionEngine {
    DecisionEngine::new(
        StorageRoot::new(dir.path()).unwrap(),
        DecisionEngineOptions::default(),
    )
}

fn level(n: u8) -> PriorityLevel {
    match n % 4 {
        0 => PriorityLevel::High,
        1 => PriorityLevel::Low,
        2 => PriorityLevel::Unknown,
        _ => PriorityLevel::Legacy(n % 10 + 1),
    }
}

prop_compose! {
    fn arb_task()(
        name in "[a-z]{3,10}",
        importance in 0u8..40,
        urgency in 0u8..40,
        active in any::<bool>(),
        goal in proptest::option::of(prop_oneof![Just("g1"), Just("g2")]),
        idle_hours in 0i64..(24 * 30),
    ) -> TaskRecord {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        let mut task = TaskRecord::new(name)
            .with_priority(level(importance), level(urgency))
            .with_active(active)
            .with_created_at(now - Duration::hours(idle_hours));
        if let Some(goal) = goal {
            task = task.with_goal(goal);
        }
        task
    }
}

proptest! {
    #[test]
    fn ranking_has_one_entry_per_active_task(tasks in prop::collection::vec(arb_task(), 0..20)) {
        let dir = TempDir::new().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        let ranked = engine(&dir).rank_tasks(&tasks, &LifeProfileSnapshot::default(), Some("g1"), now);

        let active = tasks.iter().filter(|t| t.is_active()).count();
        prop_assert_eq!(ranked.len(), active);
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for score in &ranked {
            prop_assert!(score.score.is_finite());
        }
    }

    #[test]
    fn ranking_is_deterministic(tasks in prop::collection::vec(arb_task(), 0..12)) {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        let profile = LifeProfileSnapshot::default().with_peak_hours([10]);

        let first = engine.rank_tasks(&tasks, &profile, None, now);
        let second = engine.rank_tasks(&tasks, &profile, None, now);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_inactive_tasks_never_appear() {
    let dir = TempDir::new().unwrap();
    let tasks = vec![
        TaskRecord::new("done").with_active(false),
        TaskRecord::new("open"),
    ];
    let ranked = engine(&dir).rank_tasks(&tasks, &LifeProfileSnapshot::default(), None, Utc::now());
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].task_name, "open");
}

#[test]
fn test_focus_goal_lifts_linked_task() {
    let dir = TempDir::new().unwrap();
    let now = Utc::now();
    let tasks = vec![
        TaskRecord::new("unlinked").with_created_at(now),
        TaskRecord::new("linked").with_goal("g1").with_created_at(now),
    ];
    let ranked = engine(&dir).rank_tasks(&tasks, &LifeProfileSnapshot::default(), Some("G1"), now);
    assert_eq!(ranked[0].task_name, "linked");
    assert!(ranked[0].reasons.iter().any(|r| r.contains("focus goal")));
}

#[test]
fn test_snapshot_keeps_top_entries_and_overwrites() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let now = Utc::now();
    let tasks: Vec<TaskRecord> = (0..8)
        .map(|i| TaskRecord::new(format!("task {i}")).with_created_at(now))
        .collect();
    let ranked = engine.rank_tasks(&tasks, &LifeProfileSnapshot::default(), None, now);

    let path = engine.persist_snapshot(&ranked, now).unwrap();
    engine.persist_snapshot(&ranked[..2], now).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["top"].as_array().unwrap().len(), 2);
    assert!(path.ends_with("strategy/decision_focus_snapshot.json"));
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn test_focus_brief() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    assert_eq!(engine.build_focus_brief(&[], 3), "No active tasks to focus on right now.");

    let now = Utc::now();
    let tasks = vec![
        TaskRecord::new("a").with_priority(PriorityLevel::High, PriorityLevel::High).with_created_at(now),
        TaskRecord::new("b").with_created_at(now),
    ];
    let ranked = engine.rank_tasks(&tasks, &LifeProfileSnapshot::default(), None, now);
    assert_eq!(engine.build_focus_brief(&ranked, 0), "Focus this cycle: a");
}
