//! Intent classification — the first step of every run.
//!
//! A pure function over keyword and regex matching: the same message
//! always yields the same classification, with no side effects. Richer
//! language understanding belongs behind the parse/classify seam, not
//! here.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

static TICKET_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").unwrap_or_else(|e| panic!("ticket ref regex: {e}")));

static PRIORITY_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    // "priority" alone is a noun ("what is the priority policy?"); only
    // assignment-shaped mentions count as a command.
    Regex::new(
        r"(?:\b(?:set|change|make|raise|lower|bump|give)\b.*\bpriority\b)|(?:\bpriority\b\s+(?:of\s+(?:ticket\s+)?#?\d+\s+)?(?:to|as)\b)|(?:\b(?:low|medium|normal|high|urgent|critical)\s+priority\b)",
    )
    .unwrap_or_else(|e| panic!("priority command regex: {e}"))
});

/// Interrogative lead words that mark a question.
const QUESTION_LEADS: [&str; 5] = ["what", "how", "when", "where", "why"];

/// Keywords that signal a need to search historical data.
const SEARCH_CUES: [&str; 6] = ["similar", "like", "policy", "how to", "what should", "related"];

/// Verb cues that signal a mutating command. Priority changes are
/// recognized separately by [`PRIORITY_COMMAND`].
const ACTION_CUES: [&str; 11] = [
    "assign",
    "unassign",
    "release",
    "claim",
    "close",
    "reopen",
    "resolve",
    "cancel",
    "mark",
    "add comment",
    "add note",
];

/// What an inbound message asks for. Flags are independent: one message
/// may need both a search and an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// The referenced ticket number, when the message contains `#<digits>`
    /// (first match wins).
    pub ticket_number: Option<u32>,
    /// The message looks like a question or asks for similar content.
    pub needs_search: bool,
    /// The message contains a mutating verb cue.
    pub needs_action: bool,
}

/// Classify a message. Pure and deterministic.
pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();
    let trimmed = lower.trim();

    let ticket_number = TICKET_REF
        .captures(message)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());

    let is_question = trimmed.contains('?')
        || QUESTION_LEADS
            .iter()
            .any(|w| trimmed.starts_with(w) && is_boundary(trimmed, w.len()));
    let needs_search = is_question || SEARCH_CUES.iter().any(|cue| contains_cue(&lower, cue));

    let needs_action = ACTION_CUES.iter().any(|cue| contains_cue(&lower, cue))
        || PRIORITY_COMMAND.is_match(&lower);

    Intent {
        ticket_number,
        needs_search,
        needs_action,
    }
}

/// A cue with spaces is a phrase; match it verbatim. Single words get
/// boundary checks so "assign" does not fire inside "assignment review"
/// going the other way ("unassign" is its own cue).
fn contains_cue(lower: &str, cue: &str) -> bool {
    if cue.contains(' ') {
        return lower.contains(cue);
    }
    lower.match_indices(cue).any(|(i, _)| {
        let before_ok = i == 0
            || !lower[..i]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        before_ok && is_boundary(lower, i + cue.len())
    })
}

fn is_boundary(s: &str, idx: usize) -> bool {
    idx >= s.len()
        || !s[idx..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric())
}
