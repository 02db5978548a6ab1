use crate::output::{self, OutputFormat};
use agentline_core::transcript::read_transcript_file;
use agentline_runtime_config::AgentlineConfig;
use agentline_timeline::TimelineBuilder;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct TimelineArgs {
    /// Transcript file (JSON array or JSONL of messages).
    pub file: PathBuf,
    /// Treat the transcript as still streaming.
    #[arg(long)]
    pub loading: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: TimelineArgs, config: &AgentlineConfig) -> Result<()> {
    let messages = read_transcript_file(&args.file)
        .with_context(|| format!("failed to read transcript {}", args.file.display()))?;
    tracing::debug!("Loaded {} messages from {}", messages.len(), args.file.display());

    let builder = TimelineBuilder::new(crate::config::build_options(config));
    let turns = builder.build(&messages, args.loading);

    let rendered = match args.format {
        OutputFormat::Json => output::json(&turns)?,
        OutputFormat::Text => output::render_turns(&turns),
    };
    print!("{rendered}");
    Ok(())
}
