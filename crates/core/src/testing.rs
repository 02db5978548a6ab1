use crate::{Message, ToolCall};

/// Assistant message carrying structured tool calls and no text.
pub fn assistant_calls(calls: Vec<ToolCall>) -> Message {
    Message::assistant("").with_tool_calls(calls)
}

/// Tool call with JSON arguments built from `serde_json::Value`.
pub fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall::new(id, name, arguments.to_string())
}

/// `bash` call running `command`.
pub fn bash(id: &str, command: &str) -> ToolCall {
    call(id, "bash", serde_json::json!({ "command": command }))
}

/// `read` call on `path`.
pub fn read(id: &str, path: &str) -> ToolCall {
    call(id, "read", serde_json::json!({ "path": path }))
}

/// A simple user/assistant exchange with no tools.
pub fn chat(user: &str, assistant: &str) -> Vec<Message> {
    vec![Message::user(user), Message::assistant(assistant)]
}
