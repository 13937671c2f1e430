//! Goal hierarchy command.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use priomatrix_core::GoalHierarchyEngine;

use super::{load_goals, load_tasks, print_json, CmdResult, Context};

#[derive(Args)]
pub struct GoalsArgs {
    /// JSON file with an array of long-term goals
    #[arg(long)]
    goals: PathBuf,
    /// JSON file with an array of tasks
    #[arg(long)]
    tasks: PathBuf,
    /// Output the snapshot as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(ctx: &Context, args: GoalsArgs) -> CmdResult {
    let config = ctx.config()?;
    let root = ctx.storage_root(&config)?;
    let goals = load_goals(Some(&args.goals))?;
    let tasks = load_tasks(&args.tasks)?;

    let engine = GoalHierarchyEngine::new(&root);
    let snapshot = engine.build_and_persist(&goals, &tasks, Utc::now())?;

    if args.json {
        return print_json(&snapshot);
    }

    if snapshot.goals.is_empty() {
        println!("No active goals.");
    }
    for goal in &snapshot.goals {
        println!("{} ({}, {} days, {})", goal.goal_description, goal.goal_id, goal.duration_days, goal.time_horizon);
        for theme in &goal.yearly_themes {
            println!("  theme: {theme}");
        }
        for milestone in &goal.quarterly_milestones {
            println!("  {milestone}");
        }
        for task in &goal.weekly_commitments {
            println!("  - {task}");
        }
        println!();
    }
    println!("Snapshot written: {}", engine.snapshot_path().display());
    Ok(())
}
