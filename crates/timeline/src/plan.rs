//! Splits checklist blocks out of assistant prose.

use crate::patterns::{PlanLineKind, classify_plan_line};
use agentline_core::PlanStep;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanExtraction {
    pub steps: Vec<PlanStep>,
    /// Source text with plan-block lines removed, trimmed.
    pub remaining: String,
}

/// Extract plan steps from `text`.
///
/// A block opens on a numbered or checkbox line. While open, bullets also count
/// and blank lines are swallowed; the first other line closes it. Steps from
/// every block are kept in order of appearance.
pub fn extract_plan(text: &str) -> PlanExtraction {
    let mut steps = Vec::new();
    let mut kept: Vec<&str> = Vec::new();
    let mut in_block = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            if !in_block {
                kept.push(line);
            }
            continue;
        }

        match classify_plan_line(line) {
            Some(plan_line) if in_block || plan_line.kind.opens_block() => {
                in_block = true;
                if plan_line.text.is_empty() {
                    continue;
                }
                let step = match plan_line.kind {
                    PlanLineKind::Checkbox { checked: true } => PlanStep::completed(plan_line.text),
                    _ => PlanStep::pending(plan_line.text),
                };
                steps.push(step);
            }
            _ => {
                in_block = false;
                kept.push(line);
            }
        }
    }

    PlanExtraction {
        steps,
        remaining: kept.join("\n").trim().to_string(),
    }
}
