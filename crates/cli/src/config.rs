use agentline_runtime_config::{AgentlineConfig, load_config, load_default_config};
use agentline_timeline::BuildOptions;
use anyhow::{Context, Result};
use std::path::Path;

/// Explicit `--config` wins; otherwise `$AGENTLINE_CONFIG` or the default location.
pub fn load(explicit: Option<&Path>) -> Result<AgentlineConfig> {
    match explicit {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config at {}", path.display())),
        None => load_default_config().context("Failed to load default config"),
    }
}

pub fn build_options(config: &AgentlineConfig) -> BuildOptions {
    BuildOptions {
        result_content_limit: config.timeline.result_content_limit,
        description_limit: config.timeline.description_limit,
        include_system_messages: config.timeline.include_system_messages,
    }
}

/// Print the effective configuration as TOML.
pub fn show_config(config: &AgentlineConfig) -> Result<()> {
    let encoded = toml::to_string_pretty(config).context("serialize config")?;
    print!("{encoded}");
    Ok(())
}
