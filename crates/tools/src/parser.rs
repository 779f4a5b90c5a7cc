//! Natural-language command parser.
//!
//! Turns an instruction string ("assign ticket #55 to me") into a
//! structured [`ActionRequest`]. This is the only place the mutating
//! command surface is interpreted; everything downstream dispatches on the
//! parsed tag.
//!
//! Recognized phrasings, in precedence order:
//!
//! ```text
//! assign #N to me / claim #N
//! unassign #N / release #N
//! mark #N as <status> / set status of #N to <status> / close|reopen|resolve|cancel #N
//! set priority of #N to <priority>[: <internal note>] / <priority> priority
//! add [internal] comment|note to #N: <text>
//! ```

use std::str::FromStr;
use std::sync::LazyLock;

use deskhand_core::action::ActionRequest;
use deskhand_core::error::ParseError;
use deskhand_core::ticket::{TicketPriority, TicketStatus};
use regex_lite::Regex;

static TICKET_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").unwrap_or_else(|e| panic!("ticket ref regex: {e}")));

static STATUS_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    // "mark ... as X" / "set ... status ... to X"; captures up to two words.
    Regex::new(r"(?:\bmark\b.*?\bas\b|\bset\b.*?\bstatus\b.*?\bto\b)\s+([a-z]+(?:[ _-][a-z]+)?)")
        .unwrap_or_else(|e| panic!("status regex: {e}"))
});

static PRIORITY_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    // The connective is mandatory; without it "priority" followed by an
    // arbitrary word ("priority expectations") is not a value assignment.
    // Tolerates an interleaved ticket reference: "priority of #8 to urgent".
    Regex::new(r"\bpriority\b(?:\s+of\s+(?:ticket\s+)?#?\d+)?\s+(?:to|as)\s+([a-z]+)")
        .unwrap_or_else(|e| panic!("priority regex: {e}"))
});

static PRIORITY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-z]+)\s+priority\b").unwrap_or_else(|e| panic!("priority prefix regex: {e}"))
});

static COMMENT_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\badd\b\s+(?:an?\s+)?(internal\s+)?(?:comment|note)\b")
        .unwrap_or_else(|e| panic!("comment regex: {e}"))
});

/// Parse a natural-language command into a structured action request.
///
/// A `#<number>` target is mandatory; the first match wins. Action type is
/// resolved by precedence: claim > release > status change > priority
/// change > comment.
pub fn parse(command: &str) -> Result<ActionRequest, ParseError> {
    let number = extract_ticket_number(command).ok_or(ParseError::NoTarget)?;
    let lower = command.to_lowercase();

    if is_claim(&lower) {
        return Ok(ActionRequest::Claim { number });
    }

    if is_release(&lower) {
        return Ok(ActionRequest::Release { number });
    }

    if let Some(status) = parse_status_phrase(&lower)? {
        return Ok(ActionRequest::SetStatus { number, status });
    }

    if let Some(priority) = parse_priority(&lower)? {
        // "set priority of #8 to urgent: escalated by the customer" — the
        // colon tail becomes an internal note on the change.
        let note = command
            .split_once(':')
            .map(|(_, rest)| rest.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        return Ok(ActionRequest::SetPriority { number, priority, note });
    }

    if let Some((body, internal)) = parse_comment(command, &lower)? {
        return Ok(ActionRequest::Comment {
            number,
            body,
            internal,
        });
    }

    // Bare verbs rank last: "add comment to #4: we can close it" is a
    // comment, but "close #4" on its own is a status change.
    if let Some(status) = bare_status_verb(&lower) {
        return Ok(ActionRequest::SetStatus { number, status });
    }

    Err(ParseError::UnrecognizedCommand)
}

/// Extract the first `#<digits>` reference, if any.
pub fn extract_ticket_number(text: &str) -> Option<u32> {
    TICKET_REF
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn is_claim(lower: &str) -> bool {
    contains_word(lower, "claim") || (contains_word(lower, "assign") && lower.contains("to me"))
}

fn is_release(lower: &str) -> bool {
    contains_word(lower, "unassign") || contains_word(lower, "release")
}

fn parse_status_phrase(lower: &str) -> Result<Option<TicketStatus>, ParseError> {
    if let Some(cap) = STATUS_PHRASE.captures(lower) {
        let raw = cap[1].trim();
        // The capture may have swallowed a trailing word ("closed please");
        // fall back to the first word before rejecting.
        if let Ok(status) = TicketStatus::from_str(raw) {
            return Ok(Some(status));
        }
        if let Some(first) = raw.split_whitespace().next()
            && let Ok(status) = TicketStatus::from_str(first)
        {
            return Ok(Some(status));
        }
        return Err(ParseError::InvalidStatus(raw.to_string()));
    }

    Ok(None)
}

fn bare_status_verb(lower: &str) -> Option<TicketStatus> {
    // Bare verb cues carry an implied target status.
    for (verb, status) in [
        ("close", TicketStatus::Closed),
        ("reopen", TicketStatus::InProgress),
        ("resolve", TicketStatus::Resolved),
        ("cancel", TicketStatus::Cancelled),
    ] {
        if contains_word(lower, verb) {
            return Some(status);
        }
    }

    None
}

fn parse_priority(lower: &str) -> Result<Option<TicketPriority>, ParseError> {
    if !lower.contains("priority") {
        return Ok(None);
    }

    // An explicit "to/as <value>" that names a bad value is an error; a
    // loose mention of the word "priority" is not a priority command.
    if let Some(cap) = PRIORITY_PHRASE.captures(lower) {
        let raw = cap[1].to_string();
        return TicketPriority::from_str(&raw)
            .map(Some)
            .map_err(|_| ParseError::InvalidPriority(raw));
    }

    if let Some(cap) = PRIORITY_PREFIX.captures(lower)
        && let Ok(priority) = TicketPriority::from_str(&cap[1])
    {
        return Ok(Some(priority));
    }

    Ok(None)
}

fn parse_comment(original: &str, lower: &str) -> Result<Option<(String, bool)>, ParseError> {
    let Some(cap) = COMMENT_PHRASE.captures(lower) else {
        return Ok(None);
    };
    let internal = cap.get(1).is_some();

    // Content is everything after the first colon, taken from the original
    // string so casing survives.
    let body = original
        .split_once(':')
        .map(|(_, rest)| rest.trim())
        .unwrap_or("");

    if body.is_empty() {
        return Err(ParseError::EmptyComment);
    }
    Ok(Some((body.to_string(), internal)))
}

/// Word-boundary containment check without compiling a regex per word.
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(i, _)| {
        let before_ok = i == 0
            || !haystack[..i]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let after = i + word.len();
        let after_ok = after >= haystack.len()
            || !haystack[after..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_never_guesses() {
        for cmd in [
            "assign this ticket to me",
            "close it",
            "set priority to high",
            "add comment: looks fine",
            "",
        ] {
            assert_eq!(parse(cmd).unwrap_err(), ParseError::NoTarget, "cmd: {cmd}");
        }
    }

    #[test]
    fn first_ticket_reference_wins() {
        let req = parse("close #12 and also #99").unwrap();
        assert_eq!(req.number(), 12);
    }

    #[test]
    fn assign_to_me_is_claim() {
        assert_eq!(
            parse("assign ticket #55 to me").unwrap(),
            ActionRequest::Claim { number: 55 }
        );
        assert_eq!(parse("claim #55").unwrap(), ActionRequest::Claim { number: 55 });
    }

    #[test]
    fn unassign_is_release_not_claim() {
        assert_eq!(
            parse("unassign ticket #3 to me").unwrap(),
            ActionRequest::Release { number: 3 }
        );
        assert_eq!(parse("release #3").unwrap(), ActionRequest::Release { number: 3 });
    }

    #[test]
    fn mark_as_parses_status() {
        assert_eq!(
            parse("mark ticket #42 as closed").unwrap(),
            ActionRequest::SetStatus { number: 42, status: TicketStatus::Closed }
        );
        assert_eq!(
            parse("mark #42 as in progress").unwrap(),
            ActionRequest::SetStatus { number: 42, status: TicketStatus::InProgress }
        );
        assert_eq!(
            parse("set the status of #42 to resolved").unwrap(),
            ActionRequest::SetStatus { number: 42, status: TicketStatus::Resolved }
        );
    }

    #[test]
    fn trailing_words_do_not_break_status() {
        assert_eq!(
            parse("mark #7 as closed please").unwrap(),
            ActionRequest::SetStatus { number: 7, status: TicketStatus::Closed }
        );
    }

    #[test]
    fn bare_verbs_imply_status() {
        assert_eq!(
            parse("close ticket #9").unwrap(),
            ActionRequest::SetStatus { number: 9, status: TicketStatus::Closed }
        );
        assert_eq!(
            parse("reopen #9").unwrap(),
            ActionRequest::SetStatus { number: 9, status: TicketStatus::InProgress }
        );
        assert_eq!(
            parse("cancel #9").unwrap(),
            ActionRequest::SetStatus { number: 9, status: TicketStatus::Cancelled }
        );
    }

    #[test]
    fn invalid_status_value_is_reported() {
        assert_eq!(
            parse("mark #5 as finished").unwrap_err(),
            ParseError::InvalidStatus("finished".into())
        );
    }

    #[test]
    fn priority_phrasings() {
        assert_eq!(
            parse("set priority of #8 to urgent").unwrap(),
            ActionRequest::SetPriority {
                number: 8,
                priority: TicketPriority::Urgent,
                note: None,
            }
        );
        assert_eq!(
            parse("change #8 priority to low").unwrap(),
            ActionRequest::SetPriority {
                number: 8,
                priority: TicketPriority::Low,
                note: None,
            }
        );
        assert_eq!(
            parse("give #8 high priority").unwrap(),
            ActionRequest::SetPriority {
                number: 8,
                priority: TicketPriority::High,
                note: None,
            }
        );
    }

    #[test]
    fn priority_change_colon_tail_becomes_a_note() {
        assert_eq!(
            parse("set priority of #8 to urgent: escalated by the customer").unwrap(),
            ActionRequest::SetPriority {
                number: 8,
                priority: TicketPriority::Urgent,
                note: Some("escalated by the customer".into()),
            }
        );
    }

    #[test]
    fn priority_mention_without_a_value_is_not_a_priority_command() {
        assert_eq!(
            parse("add comment to #3: customer set priority expectations").unwrap(),
            ActionRequest::Comment {
                number: 3,
                body: "customer set priority expectations".into(),
                internal: false,
            }
        );
    }

    #[test]
    fn invalid_priority_value_is_reported() {
        assert_eq!(
            parse("set priority of #8 to mega").unwrap_err(),
            ParseError::InvalidPriority("mega".into())
        );
    }

    #[test]
    fn comment_body_is_everything_after_the_colon() {
        assert_eq!(
            parse("add comment to #4: Customer confirmed the Fix works").unwrap(),
            ActionRequest::Comment {
                number: 4,
                body: "Customer confirmed the Fix works".into(),
                internal: false,
            }
        );
    }

    #[test]
    fn comment_phrasing_beats_bare_status_verbs() {
        assert_eq!(
            parse("add comment to #4: we can close this tomorrow").unwrap(),
            ActionRequest::Comment {
                number: 4,
                body: "we can close this tomorrow".into(),
                internal: false,
            }
        );
    }

    #[test]
    fn comment_mentioning_released_stays_a_comment() {
        assert_eq!(
            parse("add comment to #4: fix released to prod").unwrap(),
            ActionRequest::Comment {
                number: 4,
                body: "fix released to prod".into(),
                internal: false,
            }
        );
    }

    #[test]
    fn comment_mentioning_disclaims_stays_a_comment() {
        assert_eq!(
            parse("add comment to #2: vendor disclaims responsibility").unwrap(),
            ActionRequest::Comment {
                number: 2,
                body: "vendor disclaims responsibility".into(),
                internal: false,
            }
        );
    }

    #[test]
    fn internal_note_sets_the_flag() {
        assert_eq!(
            parse("add internal note to #4: escalate to tier 2").unwrap(),
            ActionRequest::Comment {
                number: 4,
                body: "escalate to tier 2".into(),
                internal: true,
            }
        );
    }

    #[test]
    fn empty_comment_is_rejected() {
        assert_eq!(
            parse("add comment to #4:   ").unwrap_err(),
            ParseError::EmptyComment
        );
        assert_eq!(
            parse("add comment to #4").unwrap_err(),
            ParseError::EmptyComment
        );
    }

    #[test]
    fn unrecognized_command_with_target() {
        assert_eq!(
            parse("please look at #12 sometime").unwrap_err(),
            ParseError::UnrecognizedCommand
        );
    }

    #[test]
    fn precedence_claim_over_status() {
        // "close" appears, but the assign-to-me phrasing wins.
        assert_eq!(
            parse("assign #5 to me so I can close it").unwrap(),
            ActionRequest::Claim { number: 5 }
        );
    }
}
