use std::fmt::Write as _;

use agentline_core::{ActivityKind, StatusReport, StepStatus, Turn};
use agentline_timeline::MentionState;
use anyhow::{Context, Result};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Pretty JSON followed by a newline.
pub fn json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value).context("serialize output")?;
    out.push('\n');
    Ok(out)
}

// ── Timeline ────────────────────────────────────────────────────────────

pub fn render_turns(turns: &[Turn]) -> String {
    let mut out = String::new();
    for (i, turn) in turns.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "── {} ──", turn.id);
        for item in &turn.items {
            render_item(&mut out, &item.kind);
        }
    }
    out
}

fn render_item(out: &mut String, kind: &ActivityKind) {
    match kind {
        ActivityKind::User {
            text,
            attachment_count,
            ..
        } => {
            let _ = write!(out, "user: {}", first_line(text));
            if *attachment_count > 0 {
                let _ = write!(out, " (+{attachment_count} attachments)");
            }
            out.push('\n');
        }
        ActivityKind::Assistant { text } => {
            for (i, line) in text.lines().enumerate() {
                let prefix = if i == 0 { "assistant: " } else { "  " };
                let _ = writeln!(out, "{prefix}{line}");
            }
        }
        ActivityKind::Plan { steps } => {
            out.push_str("plan:\n");
            for step in steps {
                let mark = match step.status {
                    StepStatus::Completed => "x",
                    StepStatus::Pending => " ",
                };
                let _ = writeln!(out, "  [{mark}] {}", step.text);
            }
        }
        ActivityKind::Tool(tool) => {
            let _ = write!(out, "[{}] {}", tool.status.as_str(), tool.title);
            if !tool.description.is_empty() {
                let _ = write!(out, " {}", tool.description);
            }
            out.push('\n');
            if let Some(content) = tool.content.as_deref() {
                for line in content.lines() {
                    let _ = writeln!(out, "    {line}");
                }
            }
        }
        ActivityKind::Loading => out.push_str("…\n"),
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

// ── Status ──────────────────────────────────────────────────────────────

pub fn render_status(report: &StatusReport) -> String {
    match report.detail.as_deref() {
        Some(detail) => format!("{}: {} ({detail})\n", report.status.as_str(), report.message),
        None => format!("{}: {}\n", report.status.as_str(), report.message),
    }
}

// ── Mentions ────────────────────────────────────────────────────────────

pub fn render_mentions(state: &MentionState) -> String {
    let mut out = String::new();
    if let Some(query) = state.open_query.as_deref() {
        let _ = writeln!(out, "query: @{query}");
        for suggestion in &state.suggestions {
            let _ = writeln!(out, "  {}  {}", suggestion.display_name, suggestion.path);
        }
    }
    for token in &state.closed_tokens {
        let _ = writeln!(out, "mention: {} [{}..{}]", token.path, token.start, token.end);
    }
    out
}
