//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a temporary storage root.

mod common;

use common::{parse_json, run_bin_with_home, run_cli, run_cli_success, write_input};
use serde_json::json;
use tempfile::TempDir;

fn sample_tasks() -> serde_json::Value {
    json!([
        { "description": "Fix production outage", "importance": "High", "urgency": "High" },
        { "description": "Plan next quarter", "importance": "High", "urgency": "Low", "long_term_goal_id": "g1" },
        { "description": "Archived item", "active": false }
    ])
}

#[test]
fn test_rank_json_lists_active_tasks() {
    let dir = TempDir::new().unwrap();
    let tasks = write_input(dir.path(), "tasks.json", &sample_tasks());

    let stdout = run_cli_success(dir.path(), &["rank", "--tasks", &tasks, "--json", "--persist"]);
    let ranked = parse_json(&stdout);
    let ranked = ranked.as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["task_name"], "Fix production outage");
    assert!(dir.path().join("strategy/decision_focus_snapshot.json").exists());
}

#[test]
fn test_review_writes_files() {
    let dir = TempDir::new().unwrap();
    let tasks = write_input(dir.path(), "tasks.json", &sample_tasks());
    let goals = write_input(
        dir.path(),
        "goals.json",
        &json!([{ "id": "g1", "description": "Grow the business", "total_duration": "1 year", "active": true }]),
    );

    let stdout = run_cli_success(
        dir.path(),
        &["review", "--tasks", &tasks, "--goals", &goals, "--force", "--json"],
    );
    let report = parse_json(&stdout);
    assert_eq!(report["active_task_count"], 2);

    let files = std::fs::read_dir(dir.path().join("strategy/weekly_reviews")).unwrap().count();
    assert_eq!(files, 2);
}

#[test]
fn test_goals_snapshot() {
    let dir = TempDir::new().unwrap();
    let tasks = write_input(dir.path(), "tasks.json", &sample_tasks());
    let goals = write_input(
        dir.path(),
        "goals.json",
        &json!([{ "id": "g1", "description": "Grow the business", "active": true }]),
    );

    let stdout = run_cli_success(dir.path(), &["goals", "--goals", &goals, "--tasks", &tasks, "--json"]);
    let snapshot = parse_json(&stdout);
    assert_eq!(snapshot["goals"][0]["weekly_commitments"][0], "Plan next quarter");
}

#[test]
fn test_profile_feedback_flow() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["profile", "shown", "start_10_min"]);
    run_cli_success(dir.path(), &["profile", "feedback", "start_10_min", "accepted"]);

    let metrics = parse_json(&run_cli_success(dir.path(), &["profile", "metrics"]));
    assert_eq!(metrics["suggestions_shown"], 1);
    assert_eq!(metrics["suggestions_accepted"], 1);

    let suggestions = parse_json(&run_cli_success(
        dir.path(),
        &["profile", "suggest", "write report", "--stuck-hours", "5", "--json"],
    ));
    assert_eq!(suggestions.as_array().unwrap().len(), 5);
    assert_eq!(suggestions[0]["id"], "start_10_min");
}

#[test]
fn test_profile_rejects_bad_outcome() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["profile", "feedback", "start_10_min", "maybe"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_intent_commands() {
    let dir = TempDir::new().unwrap();
    let score = parse_json(&run_cli_success(
        dir.path(),
        &["intent", "score", "remind me to call the bank tomorrow", "--json"],
    ));
    assert_eq!(score["is_task"], true);

    let quadrant = run_cli_success(dir.path(), &["intent", "quadrant", "High", "Medium"]);
    assert_eq!(quadrant.trim(), "重要不紧急");
}

#[test]
fn test_tools_list_and_analyze() {
    let dir = TempDir::new().unwrap();
    let catalog = parse_json(&run_cli_success(dir.path(), &["tools", "list", "--json"]));
    assert_eq!(catalog.as_array().unwrap().len(), 14);

    let analysis = parse_json(&run_cli_success(
        dir.path(),
        &["tools", "analyze", "Launch plan", "--skill", "premortem"],
    ));
    assert_eq!(analysis["skill_id"], "premortem");
    assert!(analysis["actions"].as_array().unwrap().len() >= 2);
}

#[test]
fn test_missing_task_file_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["rank", "--tasks", "does-not-exist.json"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("cannot read"));
}

#[test]
fn test_huge_stuck_hours_are_capped() {
    let dir = TempDir::new().unwrap();
    let suggestions = parse_json(&run_cli_success(
        dir.path(),
        &["profile", "suggest", "write report", "--stuck-hours", "1e18", "--json"],
    ));
    assert!(suggestions[0]["text"].as_str().unwrap().contains("8760h"));

    let nudge = parse_json(&run_cli_success(dir.path(), &["profile", "nudge", "--days", "4294967295"]));
    assert_eq!(nudge["sample_count"], 0);
}

#[test]
fn test_life_profile_from_reminders() {
    let dir = TempDir::new().unwrap();
    for outcome in ["completed", "completed", "updated", "dismissed"] {
        run_cli_success(dir.path(), &["profile", "reminder", outcome]);
    }
    run_cli_success(dir.path(), &["profile", "reminder-shown"]);
    let tasks = write_input(dir.path(), "tasks.json", &sample_tasks());

    let profile = parse_json(&run_cli_success(
        dir.path(),
        &["profile", "life", "--tasks", &tasks, "--json"],
    ));
    assert_eq!(profile["execution_reliability"], 0.75);
    assert_eq!(profile["active_task_count"], 2);
    assert!(!profile["peak_hours"].as_array().unwrap().is_empty());
    assert!(dir.path().join("strategy/user_life_profile.json").exists());

    let (_, stderr, code) = run_cli(dir.path(), &["profile", "reminder", "later"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_with_root_stays_in_root() {
    let dir = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    let (_, stderr, code) = run_bin_with_home(dir.path(), home.path(), &["config", "set", "review.stalled_after_days", "1"]);
    assert_eq!(code, 0, "{stderr}");
    let (stdout, _, _) = run_bin_with_home(dir.path(), home.path(), &["config", "get", "review.stalled_after_days"]);
    assert_eq!(stdout.trim(), "1");
    assert!(dir.path().join("config.toml").exists());

    let (_, _, code) = run_bin_with_home(dir.path(), home.path(), &["config", "set", "review.stalled_after_days", "99999999"]);
    assert_eq!(code, 1);

    let tasks = write_input(dir.path(), "tasks.json", &sample_tasks());
    let (_, stderr, code) = run_bin_with_home(dir.path(), home.path(), &["rank", "--tasks", &tasks]);
    assert_eq!(code, 0, "{stderr}");
    assert!(!home.path().join(".config").exists());
}
