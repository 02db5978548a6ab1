use serde::{Deserialize, Serialize};

/// Interaction mode the agent is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Plan,
    Research,
    #[default]
    Build,
}

impl Mode {
    /// Lenient parse; anything unrecognised is treated as build mode.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "plan" | "planning" => Self::Plan,
            "research" | "researching" => Self::Research,
            _ => Self::Build,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Research => "research",
            Self::Build => "build",
        }
    }
}

/// Coarse "what is the agent doing right now" label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Planning,
    Researching,
    Executing,
    Testing,
    Implementing,
    Waiting,
    Responding,
    Done,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Researching => "researching",
            Self::Executing => "executing",
            Self::Testing => "testing",
            Self::Implementing => "implementing",
            Self::Waiting => "waiting",
            Self::Responding => "responding",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: ActivityStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
