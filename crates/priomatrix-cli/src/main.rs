use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "priomatrix-cli", version, about = "Priomatrix CLI")]
struct Cli {
    /// Storage root for strategy files and profile state
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank active tasks
    Rank(commands::rank::RankArgs),
    /// Generate the weekly review
    Review(commands::review::ReviewArgs),
    /// Build the goal hierarchy snapshot
    Goals(commands::goals::GoalsArgs),
    /// Suggestion feedback and nudge policy
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Free-text task recognition
    Intent {
        #[command(subcommand)]
        action: commands::intent::IntentAction,
    },
    /// Thinking tool catalog and advice
    Tools {
        #[command(subcommand)]
        action: commands::tools::ToolsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PRIOMATRIX_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context::new(cli.root);
    let result = match cli.command {
        Commands::Rank(args) => commands::rank::run(&ctx, args),
        Commands::Review(args) => commands::review::run(&ctx, args),
        Commands::Goals(args) => commands::goals::run(&ctx, args),
        Commands::Profile { action } => commands::profile::run(&ctx, action),
        Commands::Intent { action } => commands::intent::run(&ctx, action),
        Commands::Tools { action } => commands::tools::run(&ctx, action),
        Commands::Config { action } => commands::config::run(&ctx, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
