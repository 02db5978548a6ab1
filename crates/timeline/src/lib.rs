//! Activity timeline reconstruction for agent transcripts.
//!
//! Everything here is a pure function of its inputs: the transcript is read,
//! never mutated, and each call produces a fresh result. Safe to run on every
//! streamed token and from several threads at once.

pub mod builder;
pub mod mention;
pub mod patterns;
pub mod plan;
pub mod status;
pub mod summarize;

pub use builder::{BuildOptions, TimelineBuilder, build_turns};
pub use mention::{MentionState, MentionToken, Suggestion, analyze as analyze_mentions};
pub use plan::{PlanExtraction, extract_plan};
pub use status::{StatusInput, infer_status};
pub use summarize::{ToolSummary, summarize_tool_call};
