//! Turn builder: folds an ordered transcript into turn-grouped activity items.
//!
//! The whole view is rebuilt from scratch on every call. Tool items are
//! correlated with their results by call id; a result updates the existing
//! item in place so its rendered position never moves.

use crate::patterns::{self, LegacyToolLog};
use crate::plan::extract_plan;
use crate::summarize::{DEFAULT_DESCRIPTION_LIMIT, summarize_tool_call};
use agentline_core::text::truncate_chars;
use agentline_core::{
    ActivityItem, ActivityKind, ItemKey, ItemKind, Message, Role, ToolActivity, ToolCall,
    ToolCategory, ToolOrigin, ToolStatus, Turn,
};
use std::collections::{HashMap, HashSet};

/// Default cap on tool result content, in characters.
pub const DEFAULT_RESULT_CONTENT_LIMIT: usize = 1400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub result_content_limit: usize,
    pub description_limit: usize,
    /// Render system messages as assistant text instead of skipping them.
    pub include_system_messages: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            result_content_limit: DEFAULT_RESULT_CONTENT_LIMIT,
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
            include_system_messages: false,
        }
    }
}

/// Build turns with default options.
pub fn build_turns(messages: &[Message], is_loading: bool) -> Vec<Turn> {
    TimelineBuilder::default().build(messages, is_loading)
}

#[derive(Debug, Clone, Default)]
pub struct TimelineBuilder {
    options: BuildOptions,
}

impl TimelineBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Deterministic: the same `(messages, is_loading)` always yields the same turns.
    pub fn build(&self, messages: &[Message], is_loading: bool) -> Vec<Turn> {
        let turns = BuildPass::new(&self.options, messages, is_loading).run();
        tracing::trace!(
            "Built {} turns from {} messages (loading: {})",
            turns.len(),
            messages.len(),
            is_loading
        );
        turns
    }
}

/// A tool invocation in either of the two transcript schemas.
enum ToolInvocation<'a> {
    Structured(&'a ToolCall),
    Legacy(LegacyToolLog),
}

/// State for a single rebuild. Nothing survives past `run`.
struct BuildPass<'a> {
    options: &'a BuildOptions,
    messages: &'a [Message],
    is_loading: bool,
    /// Index of the last non-system message.
    last_active: Option<usize>,
    /// Every structured call id in the transcript.
    known_calls: HashSet<&'a str>,
    /// Latest tool result per call id, anywhere in the transcript.
    results: HashMap<&'a str, &'a str>,
    turns: Vec<Turn>,
    /// Call id -> (turn index, item index) of the emitted tool item.
    positions: HashMap<&'a str, (usize, usize)>,
}

impl<'a> BuildPass<'a> {
    fn new(options: &'a BuildOptions, messages: &'a [Message], is_loading: bool) -> Self {
        let mut known_calls = HashSet::new();
        let mut results = HashMap::new();
        for message in messages {
            match message.role {
                Role::Assistant => {
                    for call in &message.tool_calls {
                        let id = call.id.trim();
                        if !id.is_empty() {
                            known_calls.insert(id);
                        }
                    }
                }
                Role::Tool => {
                    if let Some(id) = message.call_id() {
                        results.insert(id, message.content.as_str());
                    }
                }
                Role::System | Role::User => {}
            }
        }

        let last_active = messages.iter().rposition(|m| m.role != Role::System);

        Self {
            options,
            messages,
            is_loading,
            last_active,
            known_calls,
            results,
            turns: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn run(mut self) -> Vec<Turn> {
        let messages = self.messages;
        for (index, message) in messages.iter().enumerate() {
            match message.role {
                Role::System => {
                    if self.options.include_system_messages {
                        self.on_system(index, message);
                    }
                }
                Role::User => self.on_user(index, message),
                Role::Assistant => self.on_assistant(index, message),
                Role::Tool => self.on_tool(index, message),
            }
        }
        self.finish()
    }

    fn on_system(&mut self, index: usize, message: &Message) {
        let text = message.content.trim();
        if !text.is_empty() {
            self.push(
                index,
                ItemKey::new(index, ItemKind::Assistant, 0),
                ActivityKind::Assistant {
                    text: text.to_string(),
                },
            );
        }
    }

    fn on_user(&mut self, index: usize, message: &Message) {
        self.turns.push(Turn::starting_at(index));
        self.push(
            index,
            ItemKey::new(index, ItemKind::User, 0),
            ActivityKind::User {
                text: message.content.trim().to_string(),
                attachment_count: message.attachments.len(),
                mentions: patterns::input_mention_spans(&message.content)
                    .into_iter()
                    .map(|span| message.content[span.start + 1..span.end].to_string())
                    .collect(),
            },
        );
    }

    fn on_assistant(&mut self, index: usize, message: &'a Message) {
        let legacy = patterns::legacy_tool_logs(&message.content);
        let text = if legacy.is_empty() {
            message.content.trim().to_string()
        } else {
            patterns::strip_legacy_tool_logs(&message.content)
        };

        let extraction = extract_plan(&text);
        let has_text = !extraction.steps.is_empty() || !extraction.remaining.is_empty();
        if !extraction.steps.is_empty() {
            self.push(
                index,
                ItemKey::new(index, ItemKind::Plan, 0),
                ActivityKind::Plan {
                    steps: extraction.steps,
                },
            );
        }
        if !extraction.remaining.is_empty() {
            self.push(
                index,
                ItemKey::new(index, ItemKind::Assistant, 0),
                ActivityKind::Assistant {
                    text: extraction.remaining,
                },
            );
        }

        // Structured calls are authoritative; inline logs only stand in when
        // the message has none.
        let invocations: Vec<ToolInvocation<'a>> = if message.tool_calls.is_empty() {
            legacy.into_iter().map(ToolInvocation::Legacy).collect()
        } else {
            if !legacy.is_empty() {
                tracing::debug!(
                    "Dropping {} inline tool logs superseded by tool_calls in message {}",
                    legacy.len(),
                    index
                );
            }
            message.tool_calls.iter().map(ToolInvocation::Structured).collect()
        };

        let has_tools = !invocations.is_empty();
        for (sub_index, invocation) in invocations.into_iter().enumerate() {
            self.push_tool(index, sub_index, invocation);
        }

        if !has_text && !has_tools && self.is_loading && self.last_active == Some(index) {
            self.push_loading(index);
        }
    }

    fn push_tool(&mut self, index: usize, sub_index: usize, invocation: ToolInvocation<'a>) {
        let key = ItemKey::new(index, ItemKind::Tool, sub_index);
        match invocation {
            ToolInvocation::Structured(call) => {
                let summary = summarize_tool_call(
                    &call.name,
                    &call.arguments,
                    self.options.description_limit,
                );
                let id = call.id.trim();
                let mut activity = ToolActivity {
                    tool_call_id: (!id.is_empty()).then(|| id.to_string()),
                    title: summary.title,
                    category: summary.category,
                    description: summary.description,
                    status: self.unresolved_status(),
                    content: None,
                    origin: ToolOrigin::Structured,
                };
                if let Some(result) = self.results.get(id).copied() {
                    activity.resolve(result_status(result), self.cap(result));
                }
                let position = self.push(index, key, ActivityKind::Tool(activity));
                if !id.is_empty() {
                    self.positions.insert(id, position);
                }
            }
            ToolInvocation::Legacy(log) => {
                let summary = summarize_tool_call(&log.name, "", self.options.description_limit);
                let activity = ToolActivity {
                    tool_call_id: None,
                    title: summary.title,
                    category: summary.category,
                    description: summary.description,
                    status: result_status(&log.result),
                    content: (!log.result.is_empty()).then(|| self.cap(&log.result)),
                    origin: ToolOrigin::Legacy,
                };
                self.push(index, key, ActivityKind::Tool(activity));
            }
        }
    }

    fn on_tool(&mut self, index: usize, message: &'a Message) {
        let call_id = message.call_id();
        let status = result_status(&message.content);
        let content = self.cap(&message.content);

        if let Some(id) = call_id {
            if let Some(&(turn, item)) = self.positions.get(id) {
                if let Some(tool) = self.turns[turn].items[item].as_tool_mut() {
                    tool.resolve(status, content);
                }
                return;
            }
            if self.known_calls.contains(id) {
                // The call appears later in the transcript and picks this up from `results`.
                tracing::debug!("Deferring result for call {} until the call is seen", id);
                return;
            }
        }

        tracing::debug!(
            "Orphan tool result at message {} (call id: {:?})",
            index,
            call_id
        );
        let description = match call_id {
            Some(id) => format!("Result for call {id}"),
            None => "Unmatched tool result".to_string(),
        };
        self.push(
            index,
            ItemKey::new(index, ItemKind::Tool, 0),
            ActivityKind::Tool(ToolActivity {
                tool_call_id: call_id.map(str::to_string),
                title: "Tool result".to_string(),
                category: ToolCategory::Generic,
                description,
                status,
                content: Some(content),
                origin: ToolOrigin::Orphan,
            }),
        );
    }

    fn push_loading(&mut self, index: usize) {
        let already_loading = self
            .turns
            .last()
            .is_some_and(|turn| turn.items.iter().any(ActivityItem::is_loading));
        if !already_loading {
            self.push(
                index,
                ItemKey::new(index, ItemKind::Loading, 0),
                ActivityKind::Loading,
            );
        }
    }

    fn finish(mut self) -> Vec<Turn> {
        // Still waiting on the first assistant output for the latest prompt.
        if self.is_loading {
            if let Some(index) = self.last_active {
                if self.messages[index].role == Role::User {
                    self.push_loading(index);
                }
            }
        }
        self.turns.retain(|turn| !turn.items.is_empty());
        self.turns
    }

    /// Append to the current turn, opening a leading turn if no user message
    /// has been seen yet. Returns the item's (turn, item) position.
    fn push(&mut self, index: usize, key: ItemKey, kind: ActivityKind) -> (usize, usize) {
        if self.turns.is_empty() {
            self.turns.push(Turn::starting_at(index));
        }
        let turn_index = self.turns.len() - 1;
        let turn = &mut self.turns[turn_index];
        turn.items.push(ActivityItem::new(key, kind));
        (turn_index, turn.items.len() - 1)
    }

    fn unresolved_status(&self) -> ToolStatus {
        if self.is_loading {
            ToolStatus::Running
        } else {
            ToolStatus::Pending
        }
    }

    fn cap(&self, content: &str) -> String {
        truncate_chars(content, self.options.result_content_limit)
    }
}

fn result_status(content: &str) -> ToolStatus {
    if patterns::is_error_result(content) {
        ToolStatus::Error
    } else {
        ToolStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentline_core::testing::{assistant_calls, bash, chat, read};
    use agentline_core::{Attachment, PlanStep};

    fn kinds(turn: &Turn) -> Vec<ItemKind> {
        turn.items.iter().map(|item| item.kind.item_kind()).collect()
    }

    fn only_tool(turn: &Turn) -> &ToolActivity {
        let tools: Vec<&ToolActivity> = turn.tools().collect();
        assert_eq!(tools.len(), 1, "expected exactly one tool item");
        tools[0]
    }

    #[test]
    fn run_the_tests_end_to_end() {
        let messages = vec![
            Message::user("Run the tests"),
            assistant_calls(vec![bash("1", "npm test")]),
            Message::tool_result("1", "5 passed"),
        ];
        let turns = build_turns(&messages, false);
        assert_eq!(turns.len(), 1);
        assert_eq!(kinds(&turns[0]), vec![ItemKind::User, ItemKind::Tool]);
        assert_eq!(
            turns[0].items[0].kind,
            ActivityKind::User {
                text: "Run the tests".to_string(),
                attachment_count: 0,
                mentions: Vec::new(),
            }
        );
        let tool = only_tool(&turns[0]);
        assert_eq!(tool.title, "bash");
        assert_eq!(tool.description, "npm test");
        assert_eq!(tool.status, ToolStatus::Success);
        assert_eq!(tool.content.as_deref(), Some("5 passed"));
        assert_eq!(tool.tool_call_id.as_deref(), Some("1"));
        assert_eq!(turns[0].items[1].id, "1:tool:0");
    }

    #[test]
    fn unanswered_call_is_pending_or_running() {
        let messages = vec![
            Message::user("look"),
            assistant_calls(vec![read("c1", "src/lib.rs")]),
        ];
        let idle = build_turns(&messages, false);
        assert_eq!(only_tool(&idle[0]).status, ToolStatus::Pending);
        let streaming = build_turns(&messages, true);
        assert_eq!(only_tool(&streaming[0]).status, ToolStatus::Running);
        assert!(only_tool(&streaming[0]).content.is_none());
    }

    #[test]
    fn error_results_are_classified() {
        let messages = vec![
            Message::user("cat it"),
            assistant_calls(vec![read("c1", "/etc/shadow")]),
            Message::tool_result("c1", "Permission denied"),
        ];
        let turns = build_turns(&messages, true);
        assert_eq!(only_tool(&turns[0]).status, ToolStatus::Error);
    }

    #[test]
    fn result_updates_in_place_without_moving() {
        let messages = vec![
            Message::user("go"),
            assistant_calls(vec![bash("a", "ls"), bash("b", "pwd")]),
            Message::tool_result("b", "/home"),
            Message::tool_result("a", "Cargo.toml"),
            Message::assistant("Both done."),
        ];
        let turns = build_turns(&messages, false);
        assert_eq!(
            kinds(&turns[0]),
            vec![
                ItemKind::User,
                ItemKind::Tool,
                ItemKind::Tool,
                ItemKind::Assistant
            ]
        );
        let tools: Vec<&ToolActivity> = turns[0].tools().collect();
        assert_eq!(tools[0].content.as_deref(), Some("Cargo.toml"));
        assert_eq!(tools[1].content.as_deref(), Some("/home"));
    }

    #[test]
    fn last_result_wins_for_repeated_call_id() {
        let messages = vec![
            Message::user("retry"),
            assistant_calls(vec![bash("x", "make")]),
            Message::tool_result("x", "error: missing target"),
            Message::tool_result("x", "built ok"),
        ];
        let turns = build_turns(&messages, false);
        let tool = only_tool(&turns[0]);
        assert_eq!(tool.status, ToolStatus::Success);
        assert_eq!(tool.content.as_deref(), Some("built ok"));
    }

    #[test]
    fn result_seen_before_its_call_is_not_an_orphan() {
        let messages = vec![
            Message::user("go"),
            Message::tool_result("early", "done early"),
            assistant_calls(vec![bash("early", "true")]),
        ];
        let turns = build_turns(&messages, true);
        assert_eq!(kinds(&turns[0]), vec![ItemKind::User, ItemKind::Tool]);
        let tool = only_tool(&turns[0]);
        assert_eq!(tool.origin, ToolOrigin::Structured);
        assert_eq!(tool.status, ToolStatus::Success);
        assert_eq!(tool.content.as_deref(), Some("done early"));
    }

    #[test]
    fn orphan_result_becomes_one_synthetic_item() {
        let messages = vec![
            Message::user("hm"),
            Message::tool_result("ghost", "some output"),
        ];
        let turns = build_turns(&messages, false);
        let tool = only_tool(&turns[0]);
        assert_eq!(tool.origin, ToolOrigin::Orphan);
        assert_eq!(tool.title, "Tool result");
        assert_eq!(tool.category, ToolCategory::Generic);
        assert_eq!(tool.description, "Result for call ghost");
        assert_eq!(tool.tool_call_id.as_deref(), Some("ghost"));
        assert_eq!(tool.status, ToolStatus::Success);
    }

    #[test]
    fn orphan_without_call_id() {
        let mut msg = Message::tool_result("", "ERROR: boom");
        msg.tool_call_id = None;
        let turns = build_turns(&[msg], false);
        assert_eq!(turns.len(), 1);
        let tool = only_tool(&turns[0]);
        assert_eq!(tool.description, "Unmatched tool result");
        assert_eq!(tool.status, ToolStatus::Error);
        assert!(tool.tool_call_id.is_none());
    }

    #[test]
    fn result_content_is_capped() {
        let long = "y".repeat(5000);
        let messages = vec![
            Message::user("dump"),
            assistant_calls(vec![bash("d", "yes")]),
            Message::tool_result("d", long.clone()),
        ];
        let turns = build_turns(&messages, false);
        let content = only_tool(&turns[0]).content.clone().unwrap_or_default();
        assert_eq!(content, truncate_chars(&long, DEFAULT_RESULT_CONTENT_LIMIT));
        assert_eq!(content.chars().count(), DEFAULT_RESULT_CONTENT_LIMIT);
    }

    #[test]
    fn plan_is_emitted_before_prose() {
        let messages = vec![
            Message::user("fix it"),
            Message::assistant("1. read the code\n2. fix the bug\nStarting now."),
        ];
        let turns = build_turns(&messages, false);
        assert_eq!(
            kinds(&turns[0]),
            vec![ItemKind::User, ItemKind::Plan, ItemKind::Assistant]
        );
        assert_eq!(
            turns[0].items[1].kind,
            ActivityKind::Plan {
                steps: vec![
                    PlanStep::pending("read the code"),
                    PlanStep::pending("fix the bug")
                ]
            }
        );
        assert_eq!(
            turns[0].items[2].kind,
            ActivityKind::Assistant {
                text: "Starting now.".to_string()
            }
        );
    }

    #[test]
    fn legacy_logs_are_stripped_when_structured_calls_exist() {
        let mut msg = Message::assistant(
            "> Executing tool: `bash`\n> Result:\n```\nok\n```\nAll good.",
        );
        msg.tool_calls = vec![bash("s1", "echo ok")];
        let messages = vec![Message::user("run"), msg, Message::tool_result("s1", "ok")];
        let turns = build_turns(&messages, false);
        assert_eq!(
            kinds(&turns[0]),
            vec![ItemKind::User, ItemKind::Assistant, ItemKind::Tool]
        );
        assert_eq!(
            turns[0].items[1].kind,
            ActivityKind::Assistant {
                text: "All good.".to_string()
            }
        );
        assert_eq!(only_tool(&turns[0]).origin, ToolOrigin::Structured);
    }

    #[test]
    fn legacy_logs_fall_back_to_tool_items() {
        let messages = vec![
            Message::user("old session"),
            Message::assistant(
                "> Executing tool: `glob`\n```\nsrc/a.rs\n```\n> Executing tool: `bash`\n> Result:\n```\nerror: nope\n```\nSummary.",
            ),
        ];
        let turns = build_turns(&messages, false);
        assert_eq!(
            kinds(&turns[0]),
            vec![
                ItemKind::User,
                ItemKind::Assistant,
                ItemKind::Tool,
                ItemKind::Tool
            ]
        );
        let tools: Vec<&ToolActivity> = turns[0].tools().collect();
        assert_eq!(tools[0].title, "glob");
        assert_eq!(tools[0].category, ToolCategory::Search);
        assert_eq!(tools[0].status, ToolStatus::Success);
        assert_eq!(tools[0].content.as_deref(), Some("src/a.rs"));
        assert_eq!(tools[1].status, ToolStatus::Error);
        assert!(tools.iter().all(|t| t.origin == ToolOrigin::Legacy));
        assert!(tools.iter().all(|t| t.tool_call_id.is_none()));
    }

    #[test]
    fn whitespace_assistant_while_loading_shows_placeholder() {
        let messages = vec![Message::user("hi"), Message::assistant("   \n ")];
        let turns = build_turns(&messages, true);
        assert_eq!(kinds(&turns[0]), vec![ItemKind::User, ItemKind::Loading]);
        assert_eq!(turns[0].items[1].id, "1:loading:0");

        let idle = build_turns(&messages, false);
        assert_eq!(kinds(&idle[0]), vec![ItemKind::User]);
    }

    #[test]
    fn whitespace_assistant_mid_transcript_is_dropped() {
        let messages = vec![
            Message::user("hi"),
            Message::assistant(" "),
            Message::assistant("hello"),
        ];
        let turns = build_turns(&messages, true);
        assert_eq!(kinds(&turns[0]), vec![ItemKind::User, ItemKind::Assistant]);
    }

    #[test]
    fn pending_prompt_while_loading_gets_placeholder() {
        let messages = vec![Message::user("first"), Message::assistant("ok"), Message::user("second")];
        let turns = build_turns(&messages, true);
        assert_eq!(turns.len(), 2);
        assert_eq!(kinds(&turns[1]), vec![ItemKind::User, ItemKind::Loading]);
        let idle = build_turns(&messages, false);
        assert_eq!(kinds(&idle[1]), vec![ItemKind::User]);
    }

    #[test]
    fn empty_user_message_still_opens_a_turn() {
        let messages = vec![
            Message::user("  ").with_attachments(vec![Attachment {
                name: "screenshot.png".to_string(),
                mime_type: Some("image/png".to_string()),
            }]),
            Message::assistant("Nice screenshot."),
        ];
        let turns = build_turns(&messages, false);
        assert_eq!(turns.len(), 1);
        assert_eq!(
            turns[0].items[0].kind,
            ActivityKind::User {
                text: String::new(),
                attachment_count: 1,
                mentions: Vec::new(),
            }
        );
    }

    #[test]
    fn system_messages_are_skipped_by_default() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("hi"),
            Message::system("Session error: backend unavailable"),
        ];
        let turns = build_turns(&messages, false);
        assert_eq!(turns.len(), 1);
        assert_eq!(kinds(&turns[0]), vec![ItemKind::User]);

        let builder = TimelineBuilder::new(BuildOptions {
            include_system_messages: true,
            ..BuildOptions::default()
        });
        let with_system = builder.build(&messages, false);
        assert_eq!(with_system.len(), 2);
        assert_eq!(with_system[0].id, "turn-0");
        assert_eq!(
            kinds(&with_system[1]),
            vec![ItemKind::User, ItemKind::Assistant]
        );
    }

    #[test]
    fn assistant_output_before_any_user_gets_a_leading_turn() {
        let messages = vec![Message::assistant("Welcome back."), Message::user("thanks")];
        let turns = build_turns(&messages, false);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].id, "turn-0");
        assert_eq!(kinds(&turns[0]), vec![ItemKind::Assistant]);
        assert_eq!(turns[1].id, "turn-1");
    }

    #[test]
    fn empty_turns_are_dropped() {
        let messages = vec![Message::assistant("   "), Message::system("x")];
        assert!(build_turns(&messages, false).is_empty());
        assert!(build_turns(&[], true).is_empty());
    }

    #[test]
    fn rebuild_is_identical() {
        let messages = vec![
            Message::user("Run the tests"),
            Message::assistant("1. run\n2. report"),
            assistant_calls(vec![bash("1", "npm test"), read("2", "README.md")]),
            Message::tool_result("1", "5 passed"),
            Message::tool_result("zz", "stray"),
        ];
        let first = build_turns(&messages, true);
        let second = build_turns(&messages, true);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn item_ids_are_stable_as_the_transcript_grows() {
        let mut messages = vec![
            Message::user("go"),
            assistant_calls(vec![bash("1", "cargo build")]),
        ];
        let before = build_turns(&messages, true);
        messages.push(Message::tool_result("1", "Finished"));
        messages.push(Message::assistant("Built."));
        let after = build_turns(&messages, false);

        let before_ids: Vec<&str> = before[0].items.iter().map(|i| i.id.as_str()).collect();
        let after_ids: Vec<&str> = after[0].items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(before_ids, vec!["0:user:0", "1:tool:0"]);
        assert_eq!(after_ids, vec!["0:user:0", "1:tool:0", "3:assistant:0"]);
    }

    #[test]
    fn user_items_list_file_mentions() {
        let prompt = "compare @src/a.rs with @b.md, then mail me@host.com";
        let turns = build_turns(&chat(prompt, "Sure."), false);
        match &turns[0].items[0].kind {
            ActivityKind::User { mentions, .. } => {
                assert_eq!(mentions, &vec!["src/a.rs".to_string(), "b.md".to_string()]);
            }
            other => panic!("expected user item, got {other:?}"),
        }
        assert_eq!(kinds(&turns[0]), vec![ItemKind::User, ItemKind::Assistant]);
    }
}
