//! In-memory ticket store — useful for testing and ephemeral deployments.
//!
//! Implements the same conditional-update semantics a production backend
//! would express as `UPDATE ... WHERE assignee IS NULL` / `WHERE assignee =
//! $me`: the guard is checked and the patch applied under one write lock,
//! so two concurrent claims cannot both succeed.

use async_trait::async_trait;
use chrono::Utc;
use deskhand_core::error::StoreError;
use deskhand_core::store::RecordStore;
use deskhand_core::ticket::{AuditEntry, Comment, Ticket, TicketPatch};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    tickets: Vec<Ticket>,
    comments: Vec<Comment>,
    audits: Vec<AuditEntry>,
}

/// An in-memory ticket store backed by a `tokio::sync::RwLock`.
#[derive(Default)]
pub struct InMemoryTicketStore {
    inner: RwLock<Inner>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a ticket. Returns its internal id.
    pub async fn insert_ticket(&self, ticket: Ticket) -> Uuid {
        let id = ticket.id;
        self.inner.write().await.tickets.push(ticket);
        id
    }

    /// All comments recorded for a ticket, in insertion order.
    pub async fn comments_for(&self, ticket_id: Uuid) -> Vec<Comment> {
        self.inner
            .read()
            .await
            .comments
            .iter()
            .filter(|c| c.ticket_id == ticket_id)
            .cloned()
            .collect()
    }

    /// All audit entries recorded so far, in insertion order.
    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.inner.read().await.audits.clone()
    }

    /// Number of stored tickets.
    pub async fn ticket_count(&self) -> usize {
        self.inner.read().await.tickets.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryTicketStore {
    async fn get_by_number(&self, number: u32) -> Result<Option<Ticket>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.tickets.iter().find(|t| t.number == number).cloned())
    }

    async fn update_if_assignee(
        &self,
        id: Uuid,
        expected: Option<&str>,
        patch: TicketPatch,
    ) -> Result<Ticket, StoreError> {
        let mut inner = self.inner.write().await;
        let ticket = inner
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        // The guard: assignee must still be what the caller observed.
        if ticket.assignee.as_deref() != expected {
            return Err(StoreError::Conflict(id.to_string()));
        }

        if let Some(status) = patch.status {
            ticket.status = status;
        }
        if let Some(priority) = patch.priority {
            ticket.priority = priority;
        }
        if let Some(assignee) = patch.assignee {
            ticket.assignee = assignee;
        }
        ticket.updated_at = Utc::now();

        Ok(ticket.clone())
    }

    async fn insert_comment(&self, comment: Comment) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.tickets.iter().any(|t| t.id == comment.ticket_id) {
            return Err(StoreError::NotFound(comment.ticket_id.to_string()));
        }
        inner.comments.push(comment);
        Ok(())
    }

    async fn insert_audit(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.inner.write().await.audits.push(entry);
        Ok(())
    }
}
