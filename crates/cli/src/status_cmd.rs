use crate::output::{self, OutputFormat};
use agentline_core::Mode;
use agentline_core::transcript::read_transcript_file;
use agentline_runtime_config::AgentlineConfig;
use agentline_timeline::{StatusInput, TimelineBuilder, infer_status};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    /// Transcript file (JSON array or JSONL of messages).
    pub file: PathBuf,
    /// Treat the transcript as still streaming.
    #[arg(long)]
    pub loading: bool,
    /// `plan`, `research` or `build` (default from config).
    #[arg(long)]
    pub mode: Option<String>,
    /// An interactive question is waiting on the user.
    #[arg(long)]
    pub awaiting_input: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: StatusArgs, config: &AgentlineConfig) -> Result<()> {
    let messages = read_transcript_file(&args.file)
        .with_context(|| format!("failed to read transcript {}", args.file.display()))?;
    let mode = Mode::parse(args.mode.as_deref().unwrap_or(&config.status.default_mode));

    let turns = TimelineBuilder::new(crate::config::build_options(config))
        .build(&messages, args.loading);
    let mut input = StatusInput::from_timeline(&messages, &turns, mode, args.loading);
    input.awaiting_input = args.awaiting_input;
    let report = infer_status(&input);
    tracing::debug!("Status {} in {} mode", report.status.as_str(), mode.as_str());

    let rendered = match args.format {
        OutputFormat::Json => output::json(&report)?,
        OutputFormat::Text => output::render_status(&report),
    };
    print!("{rendered}");
    Ok(())
}
