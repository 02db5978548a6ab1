use serde::{Deserialize, Serialize};
use std::fmt;

/// Display category of a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Read,
    Write,
    Edit,
    Search,
    Execute,
    Generic,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Edit => "edit",
            Self::Search => "search",
            Self::Execute => "execute",
            Self::Generic => "generic",
        }
    }
}

/// Lifecycle of a tool item: `Pending -> Running -> Success | Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Pending,
    Running,
    Success,
    Error,
}

impl ToolStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Where a tool item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOrigin {
    /// A structured `tool_calls` entry on an assistant message.
    Structured,
    /// An inline "> Executing tool:" block in assistant text.
    Legacy,
    /// A tool result with no discoverable call.
    Orphan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolActivity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    pub title: String,
    pub category: ToolCategory,
    pub description: String,
    pub status: ToolStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub origin: ToolOrigin,
}

impl ToolActivity {
    /// Record a result. Terminal states are never reverted to pending/running.
    pub fn resolve(&mut self, status: ToolStatus, content: String) {
        if !status.is_terminal() && self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.content = Some(content);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub text: String,
    pub status: StepStatus,
}

impl PlanStep {
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: StepStatus::Pending,
        }
    }

    pub fn completed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: StepStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityKind {
    User {
        text: String,
        #[serde(default)]
        attachment_count: usize,
        /// `@path` references in the prompt, in order of appearance.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        mentions: Vec<String>,
    },
    Assistant {
        text: String,
    },
    Tool(ToolActivity),
    Plan {
        steps: Vec<PlanStep>,
    },
    Loading,
}

impl ActivityKind {
    pub fn item_kind(&self) -> ItemKind {
        match self {
            Self::User { .. } => ItemKind::User,
            Self::Assistant { .. } => ItemKind::Assistant,
            Self::Tool(_) => ItemKind::Tool,
            Self::Plan { .. } => ItemKind::Plan,
            Self::Loading => ItemKind::Loading,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    User,
    Assistant,
    Tool,
    Plan,
    Loading,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Plan => "plan",
            Self::Loading => "loading",
        }
    }
}

/// Identity of an item, derived only from where it came from in the transcript.
///
/// Two rebuilds over the same transcript prefix produce the same keys, so a
/// renderer can keep per-item state across recomputations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub message_index: usize,
    pub kind: ItemKind,
    pub sub_index: usize,
}

impl ItemKey {
    pub fn new(message_index: usize, kind: ItemKind, sub_index: usize) -> Self {
        Self {
            message_index,
            kind,
            sub_index,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.message_index,
            self.kind.as_str(),
            self.sub_index
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: String,
    #[serde(flatten)]
    pub kind: ActivityKind,
}

impl ActivityItem {
    pub fn new(key: ItemKey, kind: ActivityKind) -> Self {
        Self {
            id: key.to_string(),
            kind,
        }
    }

    pub fn as_tool(&self) -> Option<&ToolActivity> {
        match &self.kind {
            ActivityKind::Tool(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_tool_mut(&mut self) -> Option<&mut ToolActivity> {
        match &mut self.kind {
            ActivityKind::Tool(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.kind, ActivityKind::Loading)
    }
}

/// Items between one user message and the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub items: Vec<ActivityItem>,
}

impl Turn {
    /// Turn opened by (or starting at) the message at `message_index`.
    pub fn starting_at(message_index: usize) -> Self {
        Self {
            id: format!("turn-{message_index}"),
            items: Vec::new(),
        }
    }

    pub fn tools(&self) -> impl Iterator<Item = &ToolActivity> {
        self.items.iter().filter_map(ActivityItem::as_tool)
    }
}
