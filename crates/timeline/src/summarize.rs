//! Tool-call summaries: a display category plus a one-line description pulled
//! from the most useful argument, so renderers never parse raw payloads.

use agentline_core::ToolCategory;
use agentline_core::text::{collapse_whitespace, truncate_chars};
use serde_json::{Map, Value};

/// Default cap on description length, in characters.
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSummary {
    pub title: String,
    pub category: ToolCategory,
    pub description: String,
}

const PATH_KEYS: &[&str] = &["path", "file_path", "filePath"];
const LIST_KEYS: &[&str] = &["path", "file_path", "filePath", "dir"];
const PATTERN_KEYS: &[&str] = &["pattern", "glob"];
const QUERY_KEYS: &[&str] = &["pattern", "query", "regex"];
const COMMAND_KEYS: &[&str] = &["command", "cmd"];
const TASK_KEYS: &[&str] = &["description", "prompt"];
const SKILL_KEYS: &[&str] = &["name", "skill"];

/// How a known tool's description is produced.
enum Describe {
    /// First argument key holding a scalar value.
    Keys(&'static [&'static str]),
    Fixed(&'static str),
    TodoCount,
}

fn known_tool(lower: &str) -> Option<(ToolCategory, Describe)> {
    let entry = match lower {
        "read" | "read_file" => (ToolCategory::Read, Describe::Keys(PATH_KEYS)),
        "list" | "ls" => (ToolCategory::Read, Describe::Keys(LIST_KEYS)),
        "write" | "write_file" => (ToolCategory::Write, Describe::Keys(PATH_KEYS)),
        "edit" | "multiedit" | "patch" | "apply_patch" => {
            (ToolCategory::Edit, Describe::Keys(PATH_KEYS))
        }
        "glob" => (ToolCategory::Search, Describe::Keys(PATTERN_KEYS)),
        "search" | "grep" => (ToolCategory::Search, Describe::Keys(QUERY_KEYS)),
        "webfetch" => (ToolCategory::Search, Describe::Keys(&["url"])),
        "websearch" => (ToolCategory::Search, Describe::Keys(&["query"])),
        "bash" | "shell" => (ToolCategory::Execute, Describe::Keys(COMMAND_KEYS)),
        "task" => (ToolCategory::Generic, Describe::Keys(TASK_KEYS)),
        "todoread" => (ToolCategory::Generic, Describe::Fixed("Reading todo list")),
        "todowrite" => (ToolCategory::Generic, Describe::TodoCount),
        "skill" => (ToolCategory::Generic, Describe::Keys(SKILL_KEYS)),
        _ => return None,
    };
    Some(entry)
}

/// Summarize a tool call. Never fails: malformed or missing arguments give an
/// empty description, unknown tools fall back to the truncated raw payload.
pub fn summarize_tool_call(name: &str, raw_arguments: &str, description_limit: usize) -> ToolSummary {
    let lower = name.trim().to_ascii_lowercase();
    let title = name.trim().to_string();

    let Some((category, describe)) = known_tool(&lower) else {
        return ToolSummary {
            title,
            category: ToolCategory::Generic,
            description: truncate_chars(raw_arguments.trim(), description_limit),
        };
    };

    let args = parse_arguments(name, raw_arguments);
    let description = match describe {
        Describe::Keys(keys) => args
            .as_ref()
            .and_then(|args| first_scalar(args, keys))
            .unwrap_or_default(),
        Describe::Fixed(text) => text.to_string(),
        Describe::TodoCount => match args
            .as_ref()
            .and_then(|args| args.get("todos"))
            .and_then(Value::as_array)
        {
            Some(todos) if todos.len() == 1 => "1 todo item".to_string(),
            Some(todos) => format!("{} todo items", todos.len()),
            None => "Updating todo list".to_string(),
        },
    };

    ToolSummary {
        title,
        category,
        description: truncate_chars(&collapse_whitespace(&description), description_limit),
    }
}

/// Parse the argument payload as a JSON object; anything else counts as absent.
fn parse_arguments(name: &str, raw: &str) -> Option<Map<String, Value>> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            tracing::trace!("Tool {} arguments are not an object", name);
            None
        }
        Err(e) => {
            tracing::trace!("Unparseable arguments for tool {}: {}", name, e);
            None
        }
    }
}

fn first_scalar(args: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match args.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
