//! Task ranking command.

use std::path::PathBuf;

use chrono::{Local, Utc};
use clap::Args;
use priomatrix_core::DecisionEngine;

use super::{load_life_profile, load_tasks, print_json, CmdResult, Context};

#[derive(Args)]
pub struct RankArgs {
    /// JSON file with an array of tasks
    #[arg(long)]
    tasks: PathBuf,
    /// JSON file with the life profile snapshot (defaults to the derived one)
    #[arg(long)]
    life_profile: Option<PathBuf>,
    /// Goal id that counts as the current focus
    #[arg(long)]
    focus_goal: Option<String>,
    /// Show only the first N entries
    #[arg(long)]
    top: Option<usize>,
    /// Also write strategy/decision_focus_snapshot.json
    #[arg(long)]
    persist: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(ctx: &Context, args: RankArgs) -> CmdResult {
    let config = ctx.config()?;
    let root = ctx.storage_root(&config)?;
    let tasks = load_tasks(&args.tasks)?;
    let profile = load_life_profile(args.life_profile.as_deref(), &root)?;

    let engine = DecisionEngine::new(root, config.decision);
    let ranked = engine.rank_tasks(&tasks, &profile, args.focus_goal.as_deref(), Local::now());

    if args.persist {
        let path = engine.persist_snapshot(&ranked, Utc::now())?;
        eprintln!("Snapshot written: {}", path.display());
    }

    let shown = &ranked[..args.top.unwrap_or(ranked.len()).min(ranked.len())];
    if args.json {
        return print_json(&shown);
    }

    if shown.is_empty() {
        println!("{}", engine.build_focus_brief(&ranked, 3));
        return Ok(());
    }
    for (i, score) in shown.iter().enumerate() {
        println!(
            "{:>2}. {:.4}  [{}]  {}",
            i + 1,
            score.score,
            score.quadrant.english_label(),
            score.task_name
        );
        for reason in &score.reasons {
            println!("      - {reason}");
        }
    }
    println!();
    println!("{}", engine.build_focus_brief(&ranked, 3));
    Ok(())
}
