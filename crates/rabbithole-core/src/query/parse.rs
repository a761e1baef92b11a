//! Splits raw model output into the answer body and follow-up questions.
//!
//! The follow-up section is bounded by [`FOLLOW_UP_START_MARKER`] and
//! [`FOLLOW_UP_END_MARKER`]. Output that does not match is not an error:
//! the whole text becomes the body and the anomaly is recorded and logged.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{FOLLOW_UP_END_MARKER, FOLLOW_UP_START_MARKER};

/// Leading list tokens: `-`, `*`, `+`, `•`, `1.`, `2)`, `(3)`, each followed by
/// whitespace so `**bold**` and `1.5 billion` are left alone.
const BULLET_PATTERN: &str = r"^\s*(?:[-*+•]|\d+[.)]|\(\d+\))(?:\s+|$)";

/// A whole line wrapped in `**…**` or `__…__`.
const EMPHASIS_PATTERN: &str = r"^(?:\*\*(.+)\*\*|__(.+)__)$";

/// Inline term tags the model is asked to emit: `:item[term]`.
const ITEM_TAG_PATTERN: &str = r":item\[([^\]]*)\]";

/// Model output that did not follow the expected delimiter pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAnomaly {
    /// No start marker; no follow-ups were extracted.
    MissingStartMarker,
    /// Start marker without a closing marker; the rest of the text was used.
    MissingEndMarker,
    /// Markers present but nothing usable between them.
    EmptySection,
}

/// Result of splitting one model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnswer {
    pub body: String,
    pub follow_up_questions: Vec<String>,
    pub anomaly: Option<ParseAnomaly>,
}

/// Parses raw model text.
pub fn parse_model_output(raw: &str) -> ParsedAnswer {
    let Some(start) = raw.find(FOLLOW_UP_START_MARKER) else {
        tracing::warn!(
            len = raw.len(),
            "model output has no follow-up start marker, returning no follow-ups"
        );
        return ParsedAnswer {
            body: raw.trim().to_string(),
            follow_up_questions: Vec::new(),
            anomaly: Some(ParseAnomaly::MissingStartMarker),
        };
    };

    let before = raw[..start].trim();
    let after_start = &raw[start + FOLLOW_UP_START_MARKER.len()..];

    let (section, trailing, mut anomaly) = match after_start.find(FOLLOW_UP_END_MARKER) {
        Some(end) => (
            &after_start[..end],
            after_start[end + FOLLOW_UP_END_MARKER.len()..].trim(),
            None,
        ),
        None => {
            tracing::warn!("model output has no follow-up end marker, using the rest of the text");
            (after_start, "", Some(ParseAnomaly::MissingEndMarker))
        }
    };

    let follow_up_questions: Vec<String> = section.lines().filter_map(clean_question).collect();

    if follow_up_questions.is_empty() && anomaly.is_none() {
        tracing::warn!("model output has an empty follow-up section");
        anomaly = Some(ParseAnomaly::EmptySection);
    }

    let body = if trailing.is_empty() {
        before.to_string()
    } else {
        format!("{before}\n\n{trailing}")
    };

    ParsedAnswer {
        body,
        follow_up_questions,
        anomaly,
    }
}

/// Strips list tokens and term tags from one line; `None` for blank lines.
fn clean_question(line: &str) -> Option<String> {
    let without_bullet = BULLET_RE.replace(line, "");
    let untagged = strip_item_tags(&without_bullet);
    let cleaned = EMPHASIS_RE.replace(untagged.trim(), "$1$2");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Replaces every `:item[term]` with `term`.
pub fn strip_item_tags(text: &str) -> String {
    ITEM_TAG_RE.replace_all(text, "$1").into_owned()
}

// Constant patterns, checked by `test_patterns_compile`
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BULLET_PATTERN).expect("BULLET_PATTERN is a valid regex"));
static EMPHASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMPHASIS_PATTERN).expect("EMPHASIS_PATTERN is a valid regex"));
static ITEM_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ITEM_TAG_PATTERN).expect("ITEM_TAG_PATTERN is a valid regex"));
