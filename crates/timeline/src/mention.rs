//! `@path` mentions in draft input: autocomplete for the token under the
//! caret, removable badges for finished tokens, and the text edits behind them.
//!
//! Offsets are UTF-8 byte offsets into the current text. Nothing is cached
//! between edits; every call recomputes positions from the text it is given.

use crate::patterns;
use agentline_core::text::floor_char_boundary;
use serde::Serialize;

pub const DEFAULT_MAX_SUGGESTIONS: usize = 8;

/// A mention still being typed, spanning `start..end` where `end` is the caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenMention {
    pub start: usize,
    pub end: usize,
    /// Text after the `@`, possibly empty.
    pub query: String,
}

/// A finished `@path` token occupying `start..end` (`@` included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionToken {
    pub path: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub path: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MentionState {
    pub open_query: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub closed_tokens: Vec<MentionToken>,
}

/// Result of an edit: the new text and where the caret goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub text: String,
    pub caret: usize,
}

/// The mention being composed immediately left of `caret`, if any.
pub fn open_mention(text: &str, caret: usize) -> Option<OpenMention> {
    let caret = floor_char_boundary(text, caret);
    let prefix = &text[..caret];
    let span = patterns::open_mention_span(prefix)?;
    Some(OpenMention {
        start: span.start,
        end: span.end,
        query: prefix[span.start + 1..span.end].to_string(),
    })
}

/// Finished mention tokens anywhere in `text`, excluding the one under composition.
pub fn closed_mentions(text: &str, caret: usize) -> Vec<MentionToken> {
    let open_start = open_mention(text, caret).map(|open| open.start);
    patterns::input_mention_spans(text)
        .into_iter()
        .filter(|span| Some(span.start) != open_start)
        .map(|span| MentionToken {
            path: text[span.start + 1..span.end].to_string(),
            start: span.start,
            end: span.end,
        })
        .collect()
}

/// Rank paths for `query`: basename prefix, then path prefix, then substring.
/// Ties keep index order.
pub fn suggest<S: AsRef<str>>(query: &str, file_index: &[S], limit: usize) -> Vec<Suggestion> {
    let query = query.to_lowercase();
    let mut ranked: Vec<(u8, usize, &str)> = file_index
        .iter()
        .enumerate()
        .filter_map(|(i, path)| {
            let path = path.as_ref();
            let lower = path.to_lowercase();
            let rank = if display_name(&lower).starts_with(&query) {
                0
            } else if lower.starts_with(&query) {
                1
            } else if lower.contains(&query) {
                2
            } else {
                return None;
            };
            Some((rank, i, path))
        })
        .collect();
    ranked.sort_by_key(|(rank, i, _)| (*rank, *i));
    ranked
        .into_iter()
        .take(limit)
        .map(|(_, _, path)| Suggestion {
            path: path.to_string(),
            display_name: display_name(path).to_string(),
        })
        .collect()
}

fn display_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Everything an input box needs for one keystroke.
pub fn analyze<S: AsRef<str>>(
    text: &str,
    caret: usize,
    file_index: &[S],
    limit: usize,
) -> MentionState {
    let open = open_mention(text, caret);
    let suggestions = open
        .as_ref()
        .map(|open| suggest(&open.query, file_index, limit))
        .unwrap_or_default();
    MentionState {
        open_query: open.map(|open| open.query),
        suggestions,
        closed_tokens: closed_mentions(text, caret),
    }
}

/// Insert `@path ` for a chosen suggestion, replacing the open mention if there is one.
pub fn insert_mention(text: &str, caret: usize, path: &str) -> Edit {
    let caret = floor_char_boundary(text, caret);
    let (start, end) = match open_mention(text, caret) {
        Some(open) => (open.start, open.end),
        None => (caret, caret),
    };

    let before = &text[..start];
    let needs_separator = before
        .chars()
        .next_back()
        .is_some_and(|c| !c.is_whitespace() && !matches!(c, '(' | '[' | '{'));
    let mut insertion = String::with_capacity(path.len() + 3);
    if needs_separator {
        insertion.push(' ');
    }
    insertion.push('@');
    insertion.push_str(path);
    insertion.push(' ');

    let after = &text[end..];
    let after = after.strip_prefix(' ').unwrap_or(after);

    Edit {
        text: format!("{before}{insertion}{after}"),
        caret: start + insertion.len(),
    }
}

/// Delete a token plus one adjacent whitespace character (the following one
/// if present, otherwise the preceding one).
pub fn remove_mention(text: &str, token: &MentionToken) -> Edit {
    let Some((mut start, mut end)) = token_range(text, token) else {
        return unchanged(text, token.start);
    };
    if let Some(c) = text[end..].chars().next().filter(|c| c.is_whitespace()) {
        end += c.len_utf8();
    } else if let Some(c) = text[..start].chars().next_back().filter(|c| c.is_whitespace()) {
        start -= c.len_utf8();
    }
    Edit {
        text: format!("{}{}", &text[..start], &text[end..]),
        caret: start,
    }
}

/// Turn a finished token back into a bare `@` so the user can pick again.
pub fn replace_mention(text: &str, token: &MentionToken) -> Edit {
    let Some((start, end)) = token_range(text, token) else {
        return unchanged(text, token.start);
    };
    Edit {
        text: format!("{}@{}", &text[..start], &text[end..]),
        caret: start + 1,
    }
}

/// Token offsets checked against the current text; `None` when stale.
fn token_range(text: &str, token: &MentionToken) -> Option<(usize, usize)> {
    let slice = text.get(token.start..token.end)?;
    slice.starts_with('@').then_some((token.start, token.end))
}

fn unchanged(text: &str, caret: usize) -> Edit {
    tracing::debug!("Ignoring stale mention token at {}", caret);
    Edit {
        text: text.to_string(),
        caret: floor_char_boundary(text, caret),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &[&str] = &[
        "README.md",
        "src/app.ts",
        "src/a.ts",
        "tests/app.test.ts",
        "docs/",
    ];

    #[test]
    fn insert_into_empty_input_then_remove() {
        let inserted = insert_mention("", 0, "src/a.ts");
        assert_eq!(inserted.text, "@src/a.ts ");
        assert_eq!(inserted.caret, inserted.text.len());

        let tokens = closed_mentions(&inserted.text, inserted.caret);
        assert_eq!(
            tokens,
            vec![MentionToken {
                path: "src/a.ts".to_string(),
                start: 0,
                end: 9
            }]
        );
        let removed = remove_mention(&inserted.text, &tokens[0]);
        assert_eq!(removed.text, "");
        assert_eq!(removed.caret, 0);
    }

    #[test]
    fn insert_replaces_open_query() {
        let text = "look at @sr please";
        let caret = "look at @sr".len();
        let edit = insert_mention(text, caret, "src/app.ts");
        assert_eq!(edit.text, "look at @src/app.ts please");
        assert_eq!(edit.caret, "look at @src/app.ts ".len());
    }

    #[test]
    fn insert_mid_word_adds_separator() {
        let edit = insert_mention("fixthis", 3, "a.rs");
        assert_eq!(edit.text, "fix @a.rs this");
        assert_eq!(edit.caret, 10);
        assert_eq!(closed_mentions(&edit.text, edit.caret).len(), 1);
    }

    #[test]
    fn open_mention_under_caret() {
        let text = "check @src/ap";
        let open = open_mention(text, text.len()).unwrap();
        assert_eq!(open.start, 6);
        assert_eq!(open.end, text.len());
        assert_eq!(open.query, "src/ap");
        assert!(open_mention("check @src/ap ", 14).is_none());
        assert!(open_mention("mail me@host", 12).is_none());
    }

    #[test]
    fn bare_at_opens_with_empty_query() {
        let state = analyze("@", 1, INDEX, 3);
        assert_eq!(state.open_query.as_deref(), Some(""));
        assert_eq!(state.suggestions.len(), 3);
        assert_eq!(state.suggestions[0].path, "README.md");
        assert!(state.closed_tokens.is_empty());
    }

    #[test]
    fn suggestions_rank_basename_prefix_first() {
        let found = suggest("app", INDEX, DEFAULT_MAX_SUGGESTIONS);
        let paths: Vec<&str> = found.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["src/app.ts", "tests/app.test.ts"]);
        assert_eq!(found[0].display_name, "app.ts");

        let by_path = suggest("src/", INDEX, DEFAULT_MAX_SUGGESTIONS);
        assert_eq!(by_path.len(), 2);

        let dirs = suggest("DOC", INDEX, DEFAULT_MAX_SUGGESTIONS);
        assert_eq!(dirs[0].display_name, "docs");
    }

    #[test]
    fn analyze_separates_open_and_closed_tokens() {
        let text = "compare @README.md with @src/a";
        let state = analyze(text, text.len(), INDEX, DEFAULT_MAX_SUGGESTIONS);
        assert_eq!(state.open_query.as_deref(), Some("src/a"));
        assert_eq!(state.suggestions[0].path, "src/app.ts");
        assert_eq!(state.closed_tokens.len(), 1);
        assert_eq!(state.closed_tokens[0].path, "README.md");
        assert_eq!(&text[state.closed_tokens[0].start..state.closed_tokens[0].end], "@README.md");
    }

    #[test]
    fn no_open_mention_means_no_suggestions() {
        let state = analyze("plain text", 5, INDEX, DEFAULT_MAX_SUGGESTIONS);
        assert_eq!(state, MentionState::default());
    }

    #[test]
    fn remove_eats_preceding_space_at_end_of_text() {
        let text = "see @a.rs";
        let token = closed_mentions(text, 0).remove(0);
        let edit = remove_mention(text, &token);
        assert_eq!(edit.text, "see");
        assert_eq!(edit.caret, 3);
    }

    #[test]
    fn remove_in_middle_leaves_single_space() {
        let text = "open @a.rs and @b.rs now";
        let tokens = closed_mentions(text, 0);
        let edit = remove_mention(text, &tokens[0]);
        assert_eq!(edit.text, "open and @b.rs now");
    }

    #[test]
    fn replace_reopens_token_as_bare_at() {
        let text = "open @a.rs now";
        let token = closed_mentions(text, 0).remove(0);
        let edit = replace_mention(text, &token);
        assert_eq!(edit.text, "open @ now");
        assert_eq!(edit.caret, 6);
        let open = open_mention(&edit.text, edit.caret).unwrap();
        assert_eq!(open.query, "");
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let token = MentionToken {
            path: "gone.rs".to_string(),
            start: 2,
            end: 40,
        };
        let edit = remove_mention("hello", &token);
        assert_eq!(edit.text, "hello");
        let shifted = MentionToken {
            path: "x".to_string(),
            start: 0,
            end: 2,
        };
        assert_eq!(replace_mention("ab", &shifted).text, "ab");
    }

    #[test]
    fn caret_inside_multibyte_char_is_clamped() {
        let text = "é@a";
        let open = open_mention(text, 1);
        assert!(open.is_none());
        let at_end = open_mention("é @a", 99).unwrap();
        assert_eq!(at_end.query, "a");
    }
}
