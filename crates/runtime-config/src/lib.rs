//! Shared configuration types for agentline.
//!
//! The CLI and any embedding front end read `agentline.toml` through these
//! types. Every key is optional; a missing file or section means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "agentline.toml";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "AGENTLINE_CONFIG";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not determine home directory")]
    NoHome,
}

/// Top-level configuration (persisted as `agentline.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AgentlineConfig {
    #[serde(default)]
    pub timeline: TimelineSettings,
    #[serde(default)]
    pub status: StatusSettings,
    #[serde(default)]
    pub mentions: MentionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineSettings {
    /// Characters of tool output kept per item.
    #[serde(default = "default_result_content_limit")]
    pub result_content_limit: usize,
    /// Characters kept in a tool description.
    #[serde(default = "default_description_limit")]
    pub description_limit: usize,
    #[serde(default = "default_false")]
    pub include_system_messages: bool,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            result_content_limit: default_result_content_limit(),
            description_limit: default_description_limit(),
            include_system_messages: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusSettings {
    /// `plan`, `research` or `build`; anything else is treated as `build`.
    #[serde(default = "default_mode")]
    pub default_mode: String,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MentionSettings {
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for MentionSettings {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
        }
    }
}

fn default_false() -> bool {
    false
}
fn default_result_content_limit() -> usize {
    1400
}
fn default_description_limit() -> usize {
    160
}
fn default_mode() -> String {
    "build".to_string()
}
fn default_max_suggestions() -> usize {
    8
}

impl AgentlineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

/// Get the config directory path (~/.config/agentline/)
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(home).join(".config").join("agentline"))
}

/// `$AGENTLINE_CONFIG` when set, otherwise the canonical file under [`config_dir`].
pub fn config_path() -> Result<PathBuf, ConfigError> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(config_dir()?.join(CONFIG_FILE_NAME)),
    }
}

/// Load config from an explicit path. The file must exist.
pub fn load_config(path: &Path) -> Result<AgentlineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    AgentlineConfig::from_toml_str(&content)
}

/// Load config from [`config_path`], falling back to defaults when no file exists.
pub fn load_default_config() -> Result<AgentlineConfig, ConfigError> {
    let path = match config_path() {
        Ok(path) => path,
        Err(ConfigError::NoHome) => return Ok(AgentlineConfig::default()),
        Err(e) => return Err(e),
    };
    if !path.exists() {
        return Ok(AgentlineConfig::default());
    }
    load_config(&path)
}
