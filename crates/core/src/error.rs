//! Error types for the deskhand domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

use crate::ticket::{TicketStatus, TicketPriority};

/// The top-level error type for all deskhand operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Command parsing errors ---
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    // --- Action rule violations ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // --- Record store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Semantic search errors ---
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures turning a natural-language command into an [`crate::action::ActionRequest`].
///
/// All variants are recoverable: the orchestrator reports them back to the
/// operator as a clarifying message, never as a crashed run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("No ticket reference found. Include a ticket number like #123.")]
    NoTarget,

    #[error("I couldn't work out what action to take from that command.")]
    UnrecognizedCommand,

    #[error("'{0}' is not a valid status. Use one of: new, in_progress, resolved, closed, cancelled.")]
    InvalidStatus(String),

    #[error("'{0}' is not a valid priority. Use one of: low, medium, high, urgent.")]
    InvalidPriority(String),

    #[error("The comment text is empty. Add the comment body after the colon.")]
    EmptyComment,
}

/// An action was well-formed but violated an ownership or transition rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Ticket #{number} is already assigned to {assignee}")]
    AlreadyAssigned { number: u32, assignee: String },

    #[error("Can only {operation} your own tickets")]
    NotAssignee { operation: String },

    #[error("Cannot move a ticket from '{from}' to '{to}'")]
    InvalidTransition {
        from: TicketStatus,
        to: TicketStatus,
    },

    #[error("Ticket #{0} was not found")]
    TicketNotFound(u32),

    #[error("Priority is already {0}")]
    PriorityUnchanged(TicketPriority),
}

/// Errors from the record store collaborator.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A conditional update lost the race — the guard (expected assignee)
    /// no longer held when the write was attempted. Surfaced distinctly so
    /// callers can retry instead of reporting a generic failure.
    #[error("Conditional update conflict on ticket {0}")]
    Conflict(String),

    #[error("Ticket not found: {0}")]
    NotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Errors from the semantic search collaborator.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("Search query failed: {0}")]
    QueryFailed(String),

    #[error("Search backend unreachable: {0}")]
    Unreachable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_displays_guidance() {
        let err = Error::Parse(ParseError::NoTarget);
        assert!(err.to_string().contains("#123"));

        let err = Error::Parse(ParseError::InvalidStatus("done".into()));
        assert!(err.to_string().contains("done"));
        assert!(err.to_string().contains("in_progress"));
    }

    #[test]
    fn validation_error_names_the_rule() {
        let err = ValidationError::InvalidTransition {
            from: TicketStatus::New,
            to: TicketStatus::Closed,
        };
        assert!(err.to_string().contains("new"));
        assert!(err.to_string().contains("closed"));

        let err = ValidationError::NotAssignee {
            operation: "update status of".into(),
        };
        assert!(err.to_string().contains("your own tickets"));
    }

    #[test]
    fn conflict_is_distinct_from_not_found() {
        let conflict = StoreError::Conflict("t-1".into());
        let missing = StoreError::NotFound("t-1".into());
        assert!(conflict.to_string().contains("conflict") || conflict.to_string().contains("Conflict"));
        assert_ne!(conflict.to_string(), missing.to_string());
    }
}
