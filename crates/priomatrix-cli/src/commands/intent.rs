//! Free-text task recognition commands.

use clap::Subcommand;
use priomatrix_core::{AnalyzerWithFallback, IntentRecognizer};
use serde_json::json;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum IntentAction {
    /// Score how likely the text is a task
    Score {
        text: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Estimate importance and urgency from the text
    Priority { text: String },
    /// Quadrant label for an importance/urgency pair
    Quadrant { importance: String, urgency: String },
}

pub fn run(ctx: &Context, action: IntentAction) -> CmdResult {
    let config = ctx.config()?;
    let recognizer = IntentRecognizer::new().with_threshold(config.intent.task_threshold);

    match action {
        IntentAction::Score { text, json } => {
            let analyzer = AnalyzerWithFallback::local(recognizer);
            let score = analyzer.task_likelihood(&text);
            let is_task = analyzer.is_potential_task(&text);
            let description = analyzer.extract_description(&text);
            if json {
                return print_json(&json!({
                    "score": score,
                    "is_task": is_task,
                    "description": description,
                }));
            }
            println!("score: {score:.2}");
            println!("task:  {}", if is_task { "yes" } else { "no" });
            if let Some(description) = description.filter(|_| is_task) {
                println!("description: {description}");
            }
        }
        IntentAction::Priority { text } => {
            let (importance, urgency) = recognizer.estimate_priority(&text);
            println!("importance: {importance}");
            println!("urgency:    {urgency}");
            println!(
                "quadrant:   {}",
                recognizer.quadrant_for_levels(importance, urgency).label()
            );
        }
        IntentAction::Quadrant { importance, urgency } => {
            println!("{}", recognizer.estimate_quadrant(&importance, &urgency));
        }
    }
    Ok(())
}
