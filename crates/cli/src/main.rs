mod config;
mod mention_cmd;
mod output;
mod status_cmd;
mod timeline_cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agentline", about = "Activity timelines for coding-agent transcripts")]
struct Cli {
    /// Config file (default: $AGENTLINE_CONFIG or ~/.config/agentline/agentline.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group a transcript into turns of activity items
    Timeline(timeline_cmd::TimelineArgs),

    /// Print a one-line status for a transcript
    Status(status_cmd::StatusArgs),

    /// Analyze `@path` mentions in draft input
    Mention(mention_cmd::MentionArgs),

    /// Show the effective configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = config::load(cli.config.as_deref()).and_then(|cfg| match cli.command {
        Commands::Timeline(args) => timeline_cmd::run(args, &cfg),
        Commands::Status(args) => status_cmd::run(args, &cfg),
        Commands::Mention(args) => mention_cmd::run(args, &cfg),
        Commands::Config => config::show_config(&cfg),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
