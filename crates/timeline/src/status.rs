//! Single-line "what is the agent doing" status, derived from recent activity.

use agentline_core::{
    ActivityStatus, Message, Mode, Role, StatusReport, ToolStatus, Turn,
};
use regex::Regex;
use std::sync::LazyLock;

/// Common test-runner invocations.
static TEST_COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:npm|pnpm|yarn|bun)\s+(?:run\s+)?test|cargo\s+(?:test|nextest)|go\s+test|pytest|jest|vitest|mocha|rspec|phpunit|make\s+test|mvn\s+test|gradlew?\s+test|dotnet\s+test|run\s+(?:the\s+|all\s+)?(?:unit\s+)?tests?)\b",
    )
    .unwrap()
});

/// Phrases asking the agent to run something.
static COMMAND_INTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:run|execute|install|build|compile|deploy|launch|restart|start)\b")
        .unwrap()
});

/// Coarse grouping of tool names for status purposes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolIntent {
    Waiting,
    Execute,
    Research,
    Planning,
    Implement,
}

/// Substring table, checked in order; first hit wins.
const STATUS_KEYWORDS: &[(ToolIntent, &[&str])] = &[
    (ToolIntent::Waiting, &["question", "ask_user", "askuser", "ask_followup"]),
    (ToolIntent::Execute, &["bash", "shell", "exec", "command", "terminal"]),
    (
        ToolIntent::Research,
        &["search", "grep", "glob", "find", "list", "fetch", "web", "lsp"],
    ),
    (ToolIntent::Planning, &["todo", "plan", "task"]),
    (ToolIntent::Implement, &["read", "write", "edit", "patch", "skill"]),
];

fn tool_intent(name: &str) -> Option<ToolIntent> {
    let lower = name.trim().to_ascii_lowercase();
    if lower == "ask" {
        return Some(ToolIntent::Waiting);
    }
    STATUS_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(intent, _)| *intent)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInput<'a> {
    pub mode: Mode,
    pub is_loading: bool,
    pub recent_user_text: &'a str,
    pub recent_assistant_text: &'a str,
    pub pending_tool_names: Vec<String>,
    pub has_conversation: bool,
    /// An interactive question is waiting on the user.
    pub awaiting_input: bool,
}

impl<'a> StatusInput<'a> {
    /// Derive status inputs from a transcript and the turns built from it.
    ///
    /// Texts and pending tools are taken from the latest turn only (from the
    /// last user message on); older turns belong to finished or interrupted runs.
    pub fn from_timeline(
        messages: &'a [Message],
        turns: &[Turn],
        mode: Mode,
        is_loading: bool,
    ) -> Self {
        let latest = messages
            .iter()
            .rposition(|m| m.role == Role::User)
            .map_or(messages, |start| &messages[start..]);
        let last_text = |role: Role| {
            latest
                .iter()
                .rev()
                .filter(|m| m.role == role)
                .map(|m| m.content.trim())
                .find(|text| !text.is_empty())
                .unwrap_or("")
        };

        let pending_tool_names = turns
            .last()
            .map(|turn| {
                turn.tools()
                    .filter(|tool| matches!(tool.status, ToolStatus::Pending | ToolStatus::Running))
                    .map(|tool| tool.title.clone())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            mode,
            is_loading,
            recent_user_text: last_text(Role::User),
            recent_assistant_text: last_text(Role::Assistant),
            pending_tool_names,
            has_conversation: messages.iter().any(|m| m.role != Role::System),
            awaiting_input: false,
        }
    }
}

/// Pick the status label. Rules are evaluated in a fixed priority order.
pub fn infer_status(input: &StatusInput<'_>) -> StatusReport {
    if !input.is_loading {
        let message = if input.has_conversation {
            "Task completed"
        } else {
            "Ready when you are"
        };
        return report(ActivityStatus::Done, message, None);
    }

    let intents: Vec<ToolIntent> = input
        .pending_tool_names
        .iter()
        .filter_map(|name| tool_intent(name))
        .collect();
    let has = |intent: ToolIntent| intents.contains(&intent);
    let detail = (!input.pending_tool_names.is_empty()).then(|| input.pending_tool_names.join(", "));

    if input.awaiting_input || has(ToolIntent::Waiting) {
        return report(ActivityStatus::Waiting, "Waiting for your input", detail);
    }

    let mentions_tests = TEST_COMMAND_RE.is_match(input.recent_user_text)
        || TEST_COMMAND_RE.is_match(input.recent_assistant_text);
    if input.mode == Mode::Build && mentions_tests {
        return report(ActivityStatus::Testing, "Running tests", detail);
    }

    if COMMAND_INTENT_RE.is_match(input.recent_user_text) || has(ToolIntent::Execute) {
        return report(ActivityStatus::Executing, "Running commands", detail);
    }
    if has(ToolIntent::Research) {
        return report(ActivityStatus::Researching, "Searching the codebase", detail);
    }
    if has(ToolIntent::Planning) {
        return report(ActivityStatus::Planning, "Planning next steps", detail);
    }
    if has(ToolIntent::Implement) {
        return report(ActivityStatus::Implementing, "Making changes", detail);
    }

    match input.mode {
        Mode::Plan => report(ActivityStatus::Planning, "Planning next steps", detail),
        Mode::Research => report(ActivityStatus::Researching, "Researching", detail),
        Mode::Build => report(ActivityStatus::Responding, "Writing a response", detail),
    }
}

fn report(status: ActivityStatus, message: &str, detail: Option<String>) -> StatusReport {
    StatusReport {
        status,
        message: message.to_string(),
        detail,
    }
}
