//! Thinking tool commands.

use clap::Subcommand;
use priomatrix_core::{PriorityLevel, ThinkingToolAdvisor};

use super::{hours, print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum ToolsAction {
    /// List the tool catalog
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recommend tools for a task
    Recommend {
        /// Task description
        text: String,
        #[arg(long, default_value = "unknown")]
        importance: String,
        #[arg(long, default_value = "unknown")]
        urgency: String,
        /// Hours the task has been stuck
        #[arg(long, default_value = "0")]
        stuck_hours: f64,
        /// Attempts made so far
        #[arg(long, default_value = "0")]
        attempts: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply one tool to a task
    Analyze {
        /// Task description
        text: String,
        /// Tool id (see `tools list`)
        #[arg(long)]
        skill: String,
        #[arg(long, default_value = "unknown")]
        importance: String,
        #[arg(long, default_value = "unknown")]
        urgency: String,
        /// Hours the task has been stuck
        #[arg(long, default_value = "0")]
        stuck_hours: f64,
    },
}

pub fn run(ctx: &Context, action: ToolsAction) -> CmdResult {
    match action {
        ToolsAction::List { json } => {
            let catalog = ThinkingToolAdvisor::catalog();
            if json {
                return print_json(&catalog);
            }
            for tool in catalog {
                println!("{:<20} {}", tool.skill_id, tool.title);
                println!("    {}", tool.description);
            }
        }
        ToolsAction::Recommend {
            text,
            importance,
            urgency,
            stuck_hours,
            attempts,
            json,
        } => {
            let config = ctx.config()?;
            let advisor = ThinkingToolAdvisor::new().with_max_tools(config.advisor.max_tools);
            let recommendations = advisor.recommend_for_task(
                &text,
                PriorityLevel::parse(&importance),
                PriorityLevel::parse(&urgency),
                hours(stuck_hours),
                attempts,
            );
            if json {
                return print_json(&recommendations);
            }
            for rec in recommendations {
                println!("{:<20} {:.2}  {}", rec.skill_id, rec.confidence, rec.title);
                println!("    why:  {}", rec.why);
                println!("    next: {}", rec.next_step);
            }
        }
        ToolsAction::Analyze {
            text,
            skill,
            importance,
            urgency,
            stuck_hours,
        } => {
            let analysis = ThinkingToolAdvisor::new().analyze_task(
                &text,
                PriorityLevel::parse(&importance),
                PriorityLevel::parse(&urgency),
                hours(stuck_hours),
                &skill,
            );
            print_json(&analysis)?;
        }
    }
    Ok(())
}
