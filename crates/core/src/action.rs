//! Action requests and results — the structured form of a mutating command.
//!
//! The natural-language surface ("assign ticket #55 to me") exists only at
//! the tool boundary. Once parsed, everything downstream dispatches on this
//! tagged union with an exhaustive match, never by string sniffing.

use serde::{Deserialize, Serialize};

use crate::ticket::{Ticket, TicketPriority, TicketStatus};

/// A validated, structured request for one mutating ticket operation.
///
/// Exactly one variant per request; a target ticket number is always
/// present by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    /// Assign the ticket to the acting agent and start work.
    Claim { number: u32 },

    /// Unassign the ticket and return it to the queue.
    Release { number: u32 },

    /// Move the ticket to a new lifecycle status.
    SetStatus { number: u32, status: TicketStatus },

    /// Change the ticket's priority, optionally attaching an internal
    /// note explaining the change.
    SetPriority {
        number: u32,
        priority: TicketPriority,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// Add a public or internal comment.
    Comment {
        number: u32,
        body: String,
        internal: bool,
    },
}

impl ActionRequest {
    /// The target ticket number. Present on every variant.
    pub fn number(&self) -> u32 {
        match self {
            Self::Claim { number }
            | Self::Release { number }
            | Self::SetStatus { number, .. }
            | Self::SetPriority { number, .. }
            | Self::Comment { number, .. } => *number,
        }
    }

    /// Short label used in audit entries, traces, and the response's
    /// actions list.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Claim { .. } => "claim",
            Self::Release { .. } => "release",
            Self::SetStatus { .. } => "set_status",
            Self::SetPriority { .. } => "set_priority",
            Self::Comment { .. } => "add_comment",
        }
    }
}

/// The outcome of applying an [`ActionRequest`].
///
/// An action either commits fully or not at all; there is no partial
/// application. Failures carry the human-readable reason in `message` and
/// the machine-readable detail in `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the transition committed.
    pub success: bool,

    /// Human-readable outcome, shown to the operator.
    pub message: String,

    /// The ticket after the change, when the action committed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,

    /// Machine-readable error detail for failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    /// A successful outcome carrying the updated ticket.
    pub fn ok(message: impl Into<String>, ticket: Ticket) -> Self {
        Self {
            success: true,
            message: message.into(),
            ticket: Some(ticket),
            error: None,
        }
    }

    /// A successful outcome with no ticket payload (e.g. duplicate-comment
    /// acknowledgment).
    pub fn ok_without_ticket(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ticket: None,
            error: None,
        }
    }

    /// A failed outcome. `message` is operator-facing; `error` is the
    /// machine-readable reason.
    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ticket: None,
            error: Some(error.into()),
        }
    }
}
