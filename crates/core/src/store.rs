//! Record store contract — the storage collaborator behind the action
//! gateway.
//!
//! The store owns all ticket persistence. The one concurrency-sensitive
//! operation is `update_if_assignee`: a conditional write whose guard
//! replaces in-process locking (two concurrent claims race on the guard,
//! not on a mutex).

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::ticket::{AuditEntry, Comment, Ticket, TicketPatch};

/// The ticket storage contract.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a ticket by its human-facing number. `Ok(None)` means the
    /// number does not exist — that is an answerable outcome, not an error.
    async fn get_by_number(&self, number: u32) -> Result<Option<Ticket>, StoreError>;

    /// Conditionally apply `patch` to the ticket with `id`, but only while
    /// its assignee still equals `expected`. Returns the updated ticket, or
    /// [`StoreError::Conflict`] when the guard no longer holds.
    ///
    /// This is the optimistic-concurrency seam: "claim" passes
    /// `expected = None`, every owner-only operation passes the acting
    /// agent. Two concurrent claims therefore cannot both succeed.
    async fn update_if_assignee(
        &self,
        id: Uuid,
        expected: Option<&str>,
        patch: TicketPatch,
    ) -> Result<Ticket, StoreError>;

    /// Persist a comment. Must be atomic — on failure no partial comment
    /// may remain.
    async fn insert_comment(&self, comment: Comment) -> Result<(), StoreError>;

    /// Append an audit entry. Best-effort from the caller's perspective:
    /// the action gateway logs and swallows failures.
    async fn insert_audit(&self, entry: AuditEntry) -> Result<(), StoreError>;
}
