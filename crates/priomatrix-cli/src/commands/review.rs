//! Weekly review command.

use std::path::PathBuf;

use chrono::{Local, Utc};
use clap::Args;
use priomatrix_core::{DecisionEngine, WeeklyReviewEngine};

use super::{load_goals, load_life_profile, load_tasks, print_json, CmdResult, Context};

#[derive(Args)]
pub struct ReviewArgs {
    /// JSON file with an array of tasks
    #[arg(long)]
    tasks: PathBuf,
    /// JSON file with an array of long-term goals
    #[arg(long)]
    goals: Option<PathBuf>,
    /// JSON file with the life profile snapshot (defaults to the derived one)
    #[arg(long)]
    life_profile: Option<PathBuf>,
    /// Goal id that counts as the current focus
    #[arg(long)]
    focus_goal: Option<String>,
    /// Regenerate even if this week already has a review
    #[arg(long)]
    force: bool,
    /// Output the report as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(ctx: &Context, args: ReviewArgs) -> CmdResult {
    let config = ctx.config()?;
    let root = ctx.storage_root(&config)?;
    let tasks = load_tasks(&args.tasks)?;
    let goals = load_goals(args.goals.as_deref())?;
    let profile = load_life_profile(args.life_profile.as_deref(), &root)?;

    let ranked = DecisionEngine::new(root.clone(), config.decision).rank_tasks(
        &tasks,
        &profile,
        args.focus_goal.as_deref(),
        Local::now(),
    );
    let outcome = WeeklyReviewEngine::new(&root)
        .with_config(config.review)
        .generate_and_persist(&tasks, &goals, &profile, &ranked, Utc::now(), args.force)?;

    if args.json {
        return print_json(&outcome.report);
    }

    let report = &outcome.report;
    if !outcome.generated {
        println!("Review for {} already exists (use --force to regenerate)", report.week_key);
    }
    println!("{}", report.summary);
    println!();
    for (title, items) in [
        ("Wins", &report.wins),
        ("Risks", &report.risks),
        ("Next week", &report.next_week_strategy),
    ] {
        println!("{title}:");
        for item in items {
            println!("  - {item}");
        }
    }
    println!();
    println!("JSON:     {}", outcome.json_path.display());
    println!("Markdown: {}", outcome.markdown_path.display());
    Ok(())
}
