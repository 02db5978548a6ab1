//! Text matchers shared by the timeline builder, plan extractor and mention tokenizer.
//!
//! All regexes are immutable statics; callers get fresh iterators on every
//! call, so nothing here carries a cursor between invocations.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

// ── Legacy inline tool logs ─────────────────────────────────────────────────

/// Captures: (tool_name, fenced_result_body)
///
/// Matches a `> Executing tool: `name`` line, an optional `> Result:` line,
/// then one fenced code block holding the result. Blank lines may separate
/// the header from the fence; `\r\n` line endings are accepted.
static LEGACY_TOOL_LOG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^>[ \t]*Executing tool:[ \t]*`([^`\r\n]+)`[^\r\n]*\r?\n(?:[ \t]*\r?\n)*(?:>[ \t]*Result:[^\r\n]*\r?\n(?:[ \t]*\r?\n)*)?[ \t]*```[^\r\n]*\r?\n((?s:.*?))```[ \t\r]*(?:\n|$)",
    )
    .unwrap()
});

/// One "> Executing tool:" block found in assistant text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyToolLog {
    pub name: String,
    pub result: String,
    /// Byte range of the whole block in the source text.
    pub span: Range<usize>,
}

/// Find every non-overlapping legacy tool-log block, in order of appearance.
pub fn legacy_tool_logs(text: &str) -> Vec<LegacyToolLog> {
    LEGACY_TOOL_LOG_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(LegacyToolLog {
                name: caps.get(1)?.as_str().trim().to_string(),
                result: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Remove legacy tool-log blocks, returning the trimmed remainder.
pub fn strip_legacy_tool_logs(text: &str) -> String {
    LEGACY_TOOL_LOG_RE.replace_all(text, "").trim().to_string()
}

// ── Plan lines ──────────────────────────────────────────────────────────────

/// `1. text` or `1) text`; the text may be empty.
static NUMBERED_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)](?:\s+(.*))?$").unwrap());

/// `- [ ] text`, `- [x] text` (also `*` bullets)
static CHECKBOX_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*]\s+\[([ xX])\](?:\s+(.*))?$").unwrap());

/// `- text` or `* text`
static BULLET_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*](?:\s+(.*))?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanLineKind {
    Numbered,
    Checkbox { checked: bool },
    Bullet,
}

impl PlanLineKind {
    /// Numbered and checkbox lines may open a plan block; bullets only continue one.
    pub fn opens_block(&self) -> bool {
        !matches!(self, Self::Bullet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLine {
    pub kind: PlanLineKind,
    pub text: String,
}

/// Classify a single line as plan-shaped. Whether a bullet actually counts
/// depends on an open block, which the caller tracks.
pub fn classify_plan_line(line: &str) -> Option<PlanLine> {
    if let Some(caps) = CHECKBOX_LINE_RE.captures(line) {
        let checked = caps[1].eq_ignore_ascii_case("x");
        return Some(PlanLine {
            kind: PlanLineKind::Checkbox { checked },
            text: capture_text(&caps, 2),
        });
    }
    if let Some(caps) = NUMBERED_LINE_RE.captures(line) {
        return Some(PlanLine {
            kind: PlanLineKind::Numbered,
            text: capture_text(&caps, 1),
        });
    }
    if let Some(caps) = BULLET_LINE_RE.captures(line) {
        return Some(PlanLine {
            kind: PlanLineKind::Bullet,
            text: capture_text(&caps, 1),
        });
    }
    None
}

fn capture_text(caps: &regex::Captures<'_>, group: usize) -> String {
    caps.get(group).map_or("", |m| m.as_str()).trim().to_string()
}

// ── Mentions ────────────────────────────────────────────────────────────────

/// `@` must start the text or follow whitespace or an opening bracket, so
/// `me@host.com` and `obj@field` are not mentions.
static INPUT_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s(\[{])(@[\w./-]+)").unwrap());

/// A mention still being typed: anchored to the end of the text before the caret.
static OPEN_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s(\[{])(@[\w./-]*)$").unwrap());

/// Byte ranges of `@path` tokens, `@` included.
pub fn input_mention_spans(text: &str) -> Vec<Range<usize>> {
    INPUT_MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.range()))
        .collect()
}

/// Byte range of an unfinished `@token` that ends exactly at the end of `prefix`.
pub fn open_mention_span(prefix: &str) -> Option<Range<usize>> {
    OPEN_MENTION_RE
        .captures(prefix)
        .and_then(|caps| caps.get(1))
        .map(|m| m.range())
}

// ── Error signal ────────────────────────────────────────────────────────────

/// Whether a tool result reads as a failure.
pub fn is_error_result(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("error") || lower.contains("denied") || lower.trim_start().starts_with("err")
}
