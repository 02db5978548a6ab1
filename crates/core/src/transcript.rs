//! Transcript files: a JSON array of messages, or JSONL with one message per line.
//!
//! ```jsonl
//! {"role":"user","content":"Run the tests"}
//! {"role":"assistant","content":"","tool_calls":[{"id":"1","name":"bash","arguments":"{\"command\":\"npm test\"}"}]}
//! {"role":"tool","tool_call_id":"1","content":"5 passed"}
//! ```
//!
//! Blank lines are skipped.

use crate::message::Message;
use std::io::{self, BufRead, Read};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TranscriptError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error at line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
}

/// Parse a transcript held in memory. Accepts either a JSON array or JSONL.
pub fn parse_transcript(input: &str) -> Result<Vec<Message>, TranscriptError> {
    if input.trim_start().starts_with('[') {
        return serde_json::from_str(input).map_err(|source| TranscriptError::Json {
            line: source.line(),
            source,
        });
    }

    let mut messages = Vec::new();
    for (i, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let message = serde_json::from_str(line).map_err(|source| TranscriptError::Json {
            line: i + 1,
            source,
        })?;
        messages.push(message);
    }
    Ok(messages)
}

/// Read a whole transcript from a reader.
pub fn read_transcript<R: BufRead>(mut reader: R) -> Result<Vec<Message>, TranscriptError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse_transcript(&buf)
}

pub fn read_transcript_file(path: &Path) -> Result<Vec<Message>, TranscriptError> {
    let file = std::fs::File::open(path)?;
    read_transcript(io::BufReader::new(file))
}
