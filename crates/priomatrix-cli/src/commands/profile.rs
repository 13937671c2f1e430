//! Suggestion feedback commands.
//!
//! Record what was shown and how the user reacted, rank stuck-task
//! suggestions, print the resulting nudge policy and derive the life profile.

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use priomatrix_core::{
    FeedbackOutcome, LifeProfileEngine, PriorityLevel, ReminderOutcome, TaskRecord,
    UserProfileManager,
};

use super::{hours, load_tasks, print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Record that a suggestion was shown
    Shown {
        /// Action id (e.g. "start_10_min")
        action_id: String,
    },
    /// Record the user's response to a suggestion
    Feedback {
        /// Action id
        action_id: String,
        /// accepted, deferred or rejected
        outcome: String,
    },
    /// Rank stuck-task suggestions for a task
    Suggest {
        /// Task description
        task: String,
        /// Importance label or 1-10
        #[arg(long, default_value = "unknown")]
        importance: String,
        /// Urgency label or 1-10
        #[arg(long, default_value = "unknown")]
        urgency: String,
        /// Hours the task has been stuck
        #[arg(long, default_value = "0")]
        stuck_hours: f64,
        /// Action id suggested last time
        #[arg(long)]
        last: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the adaptive nudge policy
    Nudge {
        /// Days of history to sample
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Show suggestion metrics
    Metrics {
        /// Window in days
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Record that a task reminder was shown
    ReminderShown,
    /// Record how a task reminder was answered
    Reminder {
        /// completed, updated, snoozed or dismissed
        outcome: String,
    },
    /// Derive the life profile from reminder history and tasks
    Life {
        /// JSON file with an array of tasks
        #[arg(long)]
        tasks: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(ctx: &Context, action: ProfileAction) -> CmdResult {
    let config = ctx.config()?;
    let root = ctx.storage_root(&config)?;
    let mut manager = UserProfileManager::new(&root);

    match action {
        ProfileAction::Shown { action_id } => {
            manager.record_suggestion_shown(&action_id)?;
            println!("ok");
        }
        ProfileAction::Feedback { action_id, outcome } => {
            let outcome: FeedbackOutcome = outcome.parse()?;
            manager.record_suggestion_feedback(&action_id, outcome)?;
            println!("ok");
        }
        ProfileAction::Suggest {
            task,
            importance,
            urgency,
            stuck_hours,
            last,
            json,
        } => {
            let task = TaskRecord::new(task)
                .with_priority(PriorityLevel::parse(&importance), PriorityLevel::parse(&urgency));
            let suggestions =
                manager.get_ranked_stuck_suggestions(&task, hours(stuck_hours), last.as_deref())?;
            if json {
                return print_json(&suggestions);
            }
            for (i, s) in suggestions.iter().enumerate() {
                println!("{}. {:<18} {:.4}  {}", i + 1, s.id, s.score, s.text);
            }
        }
        ProfileAction::Nudge { days } => {
            print_json(&manager.get_adaptive_nudge_recommendation(days)?)?;
        }
        ProfileAction::Metrics { days } => {
            print_json(&manager.get_dashboard_metrics(days)?)?;
        }
        ProfileAction::ReminderShown => {
            manager.record_reminder_shown()?;
            println!("ok");
        }
        ProfileAction::Reminder { outcome } => {
            let outcome: ReminderOutcome = outcome.parse()?;
            manager.record_reminder_result(outcome)?;
            println!("ok");
        }
        ProfileAction::Life { tasks, json } => {
            let tasks = match tasks {
                Some(path) => load_tasks(&path)?,
                None => Vec::new(),
            };
            let engine = LifeProfileEngine::new(&root);
            let profile = engine.build_and_persist(&manager.snapshot()?, &tasks, Utc::now())?;
            if json {
                return print_json(&profile);
            }
            let join = |set: &std::collections::BTreeSet<String>| {
                set.iter().cloned().collect::<Vec<_>>().join(", ")
            };
            println!("Execution reliability:    {:.2}", profile.execution_reliability);
            println!("Interruption sensitivity: {:.2}", profile.interruption_sensitivity);
            println!("Decision style:           {:?}", profile.decision_style);
            println!("Strengths:                {}", join(&profile.strengths));
            println!("Risk triggers:            {}", join(&profile.risk_triggers));
            println!("Saved to {}", engine.profile_path().display());
        }
    }
    Ok(())
}
