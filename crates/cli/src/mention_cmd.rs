use crate::output::{self, OutputFormat};
use agentline_runtime_config::AgentlineConfig;
use agentline_timeline::analyze_mentions;
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Args)]
pub struct MentionArgs {
    /// Draft input text.
    pub text: String,
    /// Caret byte offset (default: end of text).
    #[arg(long)]
    pub caret: Option<usize>,
    /// File index, one path per line.
    #[arg(long)]
    pub index: Option<PathBuf>,
    /// Maximum suggestions (default from config).
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: MentionArgs, config: &AgentlineConfig) -> Result<()> {
    let index = match args.index.as_deref() {
        Some(path) => read_index(path)?,
        None => Vec::new(),
    };
    let caret = args.caret.unwrap_or(args.text.len());
    let limit = args.limit.unwrap_or(config.mentions.max_suggestions);
    let state = analyze_mentions(&args.text, caret, &index, limit);

    let rendered = match args.format {
        OutputFormat::Json => output::json(&state)?,
        OutputFormat::Text => output::render_mentions(&state),
    };
    print!("{rendered}");
    Ok(())
}

fn read_index(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file index {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
