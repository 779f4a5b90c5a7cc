//! Ticket domain model — status, priority, and the transition table.
//!
//! A `Ticket` is the one shared mutable resource in the system. It is only
//! ever mutated through the action gateway's validated transitions; the
//! agent core reads and writes it via the [`crate::store::RecordStore`]
//! contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    New,
    InProgress,
    Resolved,
    Closed,
    Cancelled,
}

impl TicketStatus {
    /// The fixed table of legal status moves. Anything not listed here is
    /// rejected by the action gateway with a descriptive error, never
    /// silently coerced.
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (New, InProgress)
                | (New, Cancelled)
                | (InProgress, Cancelled)
                | (InProgress, Closed)
                | (Resolved, Closed)
                | (Resolved, InProgress)
                | (Closed, InProgress)
                | (Cancelled, InProgress)
        )
    }

    /// All statuses, in display order.
    pub fn all() -> [TicketStatus; 5] {
        [
            TicketStatus::New,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
            TicketStatus::Cancelled,
        ]
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Resolved => write!(f, "resolved"),
            Self::Closed => write!(f, "closed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "new" | "open" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(other.to_string()),
        }
    }
}

/// Urgency of a ticket. No transition table — any priority may follow any
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

impl FromStr for TicketPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "normal" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" | "critical" => Ok(Self::Urgent),
            other => Err(other.to_string()),
        }
    }
}

/// A support ticket record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Internal identifier.
    pub id: Uuid,

    /// Stable, human-facing ticket number (`#123`).
    pub number: u32,

    /// Short subject line.
    pub subject: String,

    /// Full problem description.
    pub description: String,

    /// Current lifecycle status.
    pub status: TicketStatus,

    /// Current priority.
    pub priority: TicketPriority,

    /// The agent currently working the ticket, if any.
    pub assignee: Option<String>,

    /// When the ticket was created.
    pub created_at: DateTime<Utc>,

    /// When the ticket was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Create a new unassigned ticket in status `new`.
    pub fn new(number: u32, subject: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            number,
            subject: subject.into(),
            description: description.into(),
            status: TicketStatus::New,
            priority: TicketPriority::Medium,
            assignee: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Subject and description joined for embedding / anchored search.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.subject, self.description)
    }

    /// Whether the given agent is the current assignee.
    pub fn is_assigned_to(&self, agent_id: &str) -> bool {
        self.assignee.as_deref() == Some(agent_id)
    }
}

/// A partial update to a ticket, applied through the store's conditional
/// update. Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketPatch {
    /// New status, if changing.
    pub status: Option<TicketStatus>,
    /// New priority, if changing.
    pub priority: Option<TicketPriority>,
    /// New assignee. `Some(None)` clears the assignment.
    pub assignee: Option<Option<String>>,
}

impl TicketPatch {
    /// A patch that claims the ticket for `agent_id` and starts work.
    pub fn claim(agent_id: &str) -> Self {
        Self {
            status: Some(TicketStatus::InProgress),
            assignee: Some(Some(agent_id.to_string())),
            ..Default::default()
        }
    }

    /// A patch that releases the ticket back to the queue.
    pub fn release() -> Self {
        Self {
            status: Some(TicketStatus::New),
            assignee: Some(None),
            ..Default::default()
        }
    }

    /// A patch that only changes status.
    pub fn status(status: TicketStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// A patch that only changes priority.
    pub fn priority(priority: TicketPriority) -> Self {
        Self {
            priority: Some(priority),
            ..Default::default()
        }
    }
}

/// A comment on a ticket, public or internal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Ticket the comment belongs to.
    pub ticket_id: Uuid,
    /// Agent who wrote it.
    pub author: String,
    /// Comment text.
    pub body: String,
    /// Internal notes are only visible to agents, never to the customer.
    pub internal: bool,
    /// When the comment was created.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(ticket_id: Uuid, author: impl Into<String>, body: impl Into<String>, internal: bool) -> Self {
        Self {
            ticket_id,
            author: author.into(),
            body: body.into(),
            internal,
            created_at: Utc::now(),
        }
    }
}

/// An audit trail entry recording one attempted action, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Agent who attempted the action.
    pub actor: String,
    /// Action label, e.g. "claim", "set_status".
    pub action: String,
    /// Target ticket number.
    pub ticket_number: u32,
    /// Whether the action committed.
    pub success: bool,
    /// Outcome detail (success message or rejection reason).
    pub detail: String,
    /// When the attempt happened.
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        ticket_number: u32,
        success: bool,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            actor: actor.into(),
            action: action.into(),
            ticket_number,
            success,
            detail: detail.into(),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_allows_listed_moves() {
        use TicketStatus::*;
        assert!(New.can_transition_to(InProgress));
        assert!(New.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Closed));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(Resolved.can_transition_to(Closed));
        assert!(Resolved.can_transition_to(InProgress));
        assert!(Closed.can_transition_to(InProgress));
        assert!(Cancelled.can_transition_to(InProgress));
    }

    #[test]
    fn transition_table_rejects_everything_else() {
        use TicketStatus::*;
        assert!(!New.can_transition_to(Closed));
        assert!(!New.can_transition_to(Resolved));
        assert!(!InProgress.can_transition_to(New));
        assert!(!Closed.can_transition_to(Closed));
        assert!(!Cancelled.can_transition_to(Closed));

        // No status may transition to itself
        for s in TicketStatus::all() {
            assert!(!s.can_transition_to(s), "{s} should not self-transition");
        }
    }

    #[test]
    fn status_parses_wire_names() {
        assert_eq!("in_progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert_eq!("In Progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert_eq!("canceled".parse::<TicketStatus>().unwrap(), TicketStatus::Cancelled);
        assert!("done".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn priority_parses_aliases() {
        assert_eq!("URGENT".parse::<TicketPriority>().unwrap(), TicketPriority::Urgent);
        assert_eq!("normal".parse::<TicketPriority>().unwrap(), TicketPriority::Medium);
        assert!("asap".parse::<TicketPriority>().is_err());
    }

    #[test]
    fn new_ticket_is_unassigned() {
        let t = Ticket::new(7, "Printer jam", "The office printer is jammed again");
        assert_eq!(t.status, TicketStatus::New);
        assert_eq!(t.priority, TicketPriority::Medium);
        assert!(t.assignee.is_none());
        assert!(!t.is_assigned_to("alice"));
    }

    #[test]
    fn claim_patch_sets_assignee_and_status() {
        let patch = TicketPatch::claim("alice");
        assert_eq!(patch.status, Some(TicketStatus::InProgress));
        assert_eq!(patch.assignee, Some(Some("alice".into())));
        assert!(patch.priority.is_none());
    }
}
