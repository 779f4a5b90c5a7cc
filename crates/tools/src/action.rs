//! Ticket action gateway — the sole mutator of ticket state.
//!
//! Exposes the fixed set of permitted transitions (claim, release,
//! set_status, set_priority, add_comment) with ownership and
//! transition-validity checks. Concurrency is handled by the store's
//! conditional update, not by in-process locks: claim races resolve to
//! exactly one winner at the storage guard.
//!
//! Every attempt, success or failure, is written to the audit trail
//! fire-and-forget — an audit failure is logged and swallowed, never
//! escalated into the action outcome.

use std::sync::Arc;

use async_trait::async_trait;
use deskhand_core::action::{ActionRequest, ActionResult};
use deskhand_core::error::{StoreError, ValidationError};
use deskhand_core::store::RecordStore;
use deskhand_core::ticket::{AuditEntry, Comment, Ticket, TicketPatch, TicketPriority, TicketStatus};
use deskhand_core::tool::{CallContext, Tool, error_payload};
use tracing::{debug, warn};

use crate::dedup::DedupCache;
use crate::parser;

/// Applies validated mutating actions to tickets.
pub struct ActionGateway {
    store: Arc<dyn RecordStore>,
    dedup: Arc<dyn DedupCache>,
}

impl ActionGateway {
    pub fn new(store: Arc<dyn RecordStore>, dedup: Arc<dyn DedupCache>) -> Self {
        Self { store, dedup }
    }

    /// Apply one action on behalf of `agent_id`. The outcome is always an
    /// [`ActionResult`]; rule violations and storage races come back as
    /// failed results with a natural-language reason, never as panics or
    /// raw backend errors.
    pub async fn apply(&self, request: &ActionRequest, agent_id: &str) -> ActionResult {
        let result = match request {
            ActionRequest::Claim { number } => self.claim(*number, agent_id).await,
            ActionRequest::Release { number } => self.release(*number, agent_id).await,
            ActionRequest::SetStatus { number, status } => {
                self.set_status(*number, *status, agent_id).await
            }
            ActionRequest::SetPriority {
                number,
                priority,
                note,
            } => {
                self.set_priority(*number, *priority, note.as_deref(), agent_id)
                    .await
            }
            ActionRequest::Comment {
                number,
                body,
                internal,
            } => self.add_comment(*number, body, *internal, agent_id).await,
        };

        self.audit(request, agent_id, &result).await;
        result
    }

    async fn claim(&self, number: u32, agent_id: &str) -> ActionResult {
        let ticket = match self.load(number).await {
            Ok(t) => t,
            Err(r) => return r,
        };

        if let Some(assignee) = &ticket.assignee {
            let reason = ValidationError::AlreadyAssigned {
                number,
                assignee: assignee.clone(),
            };
            return ActionResult::failed(reason.to_string(), "already_assigned");
        }

        // Conditional on "assignee is still None" — a concurrent claim that
        // lands first turns this into a conflict, not a double assignment.
        match self
            .store
            .update_if_assignee(ticket.id, None, TicketPatch::claim(agent_id))
            .await
        {
            Ok(updated) => ActionResult::ok(
                format!("Ticket #{number} is now assigned to you and marked in progress."),
                updated,
            ),
            Err(StoreError::Conflict(_)) => ActionResult::failed(
                format!("Ticket #{number} was claimed by someone else just now."),
                "already_assigned",
            ),
            Err(e) => self.backend_failure(number, e),
        }
    }

    async fn release(&self, number: u32, agent_id: &str) -> ActionResult {
        let ticket = match self.load(number).await {
            Ok(t) => t,
            Err(r) => return r,
        };

        if !ticket.is_assigned_to(agent_id) {
            let reason = ValidationError::NotAssignee {
                operation: "release".into(),
            };
            return ActionResult::failed(reason.to_string(), "not_assignee");
        }

        match self
            .store
            .update_if_assignee(ticket.id, Some(agent_id), TicketPatch::release())
            .await
        {
            Ok(updated) => ActionResult::ok(
                format!("Ticket #{number} is unassigned and back in the queue."),
                updated,
            ),
            Err(StoreError::Conflict(_)) => self.conflict(number),
            Err(e) => self.backend_failure(number, e),
        }
    }

    async fn set_status(&self, number: u32, status: TicketStatus, agent_id: &str) -> ActionResult {
        let ticket = match self.load(number).await {
            Ok(t) => t,
            Err(r) => return r,
        };

        if !ticket.is_assigned_to(agent_id) {
            let reason = ValidationError::NotAssignee {
                operation: "update status of".into(),
            };
            return ActionResult::failed(reason.to_string(), "not_assignee");
        }

        if !ticket.status.can_transition_to(status) {
            let reason = ValidationError::InvalidTransition {
                from: ticket.status,
                to: status,
            };
            return ActionResult::failed(reason.to_string(), "invalid_transition");
        }

        match self
            .store
            .update_if_assignee(ticket.id, Some(agent_id), TicketPatch::status(status))
            .await
        {
            Ok(updated) => ActionResult::ok(
                format!("Ticket #{number} status changed to {status}."),
                updated,
            ),
            Err(StoreError::Conflict(_)) => self.conflict(number),
            Err(e) => self.backend_failure(number, e),
        }
    }

    async fn set_priority(
        &self,
        number: u32,
        priority: TicketPriority,
        note: Option<&str>,
        agent_id: &str,
    ) -> ActionResult {
        let ticket = match self.load(number).await {
            Ok(t) => t,
            Err(r) => return r,
        };

        if !ticket.is_assigned_to(agent_id) {
            let reason = ValidationError::NotAssignee {
                operation: "change priority of".into(),
            };
            return ActionResult::failed(reason.to_string(), "not_assignee");
        }

        match self
            .store
            .update_if_assignee(ticket.id, Some(agent_id), TicketPatch::priority(priority))
            .await
        {
            Ok(updated) => {
                let mut message = format!("Ticket #{number} priority set to {priority}.");
                if let Some(body) = note {
                    // The priority change already committed; a failed note
                    // write is logged, not surfaced as an action failure.
                    let comment = Comment::new(updated.id, agent_id, body, true);
                    match self.store.insert_comment(comment).await {
                        Ok(()) => message.push_str(" Internal note added."),
                        Err(e) => warn!(number, error = %e, "Failed to attach priority note"),
                    }
                }
                ActionResult::ok(message, updated)
            }
            Err(StoreError::Conflict(_)) => self.conflict(number),
            Err(e) => self.backend_failure(number, e),
        }
    }

    async fn add_comment(
        &self,
        number: u32,
        body: &str,
        internal: bool,
        agent_id: &str,
    ) -> ActionResult {
        let ticket = match self.load(number).await {
            Ok(t) => t,
            Err(r) => return r,
        };

        if !ticket.is_assigned_to(agent_id) {
            let reason = ValidationError::NotAssignee {
                operation: "comment on".into(),
            };
            return ActionResult::failed(reason.to_string(), "not_assignee");
        }

        // Retried tool calls double-post; identical content inside the
        // window is acknowledged without a second insert.
        if self.dedup.check_and_record(number, body) {
            debug!(number, "Suppressed duplicate comment");
            return ActionResult::ok_without_ticket(format!(
                "That comment on ticket #{number} was already processed."
            ));
        }

        let comment = Comment::new(ticket.id, agent_id, body, internal);
        match self.store.insert_comment(comment).await {
            Ok(()) => {
                let visibility = if internal { "Internal note" } else { "Comment" };
                ActionResult::ok(format!("{visibility} added to ticket #{number}."), ticket)
            }
            Err(e) => self.backend_failure(number, e),
        }
    }

    async fn load(&self, number: u32) -> Result<Ticket, ActionResult> {
        match self.store.get_by_number(number).await {
            Ok(Some(ticket)) => Ok(ticket),
            Ok(None) => {
                let reason = ValidationError::TicketNotFound(number);
                Err(ActionResult::failed(reason.to_string(), "not_found"))
            }
            Err(e) => Err(self.backend_failure(number, e)),
        }
    }

    fn conflict(&self, number: u32) -> ActionResult {
        // Surfaced distinctly so a caller can retry rather than treat it
        // as a rule violation.
        ActionResult::failed(
            format!("Ticket #{number} changed concurrently. Please retry."),
            "conflict",
        )
    }

    fn backend_failure(&self, number: u32, error: StoreError) -> ActionResult {
        warn!(number, error = %error, "Ticket store operation failed");
        ActionResult::failed(
            format!("The ticket system is currently unavailable for ticket #{number}."),
            "backend_error",
        )
    }

    async fn audit(&self, request: &ActionRequest, agent_id: &str, result: &ActionResult) {
        let entry = AuditEntry::new(
            agent_id,
            request.kind(),
            request.number(),
            result.success,
            result.message.clone(),
        );
        if let Err(e) = self.store.insert_audit(entry).await {
            warn!(error = %e, "Failed to write audit entry");
        }
    }
}

/// The action capability exposed to the orchestrator: a natural-language
/// command string in, an `ActionResult` JSON document out.
pub struct ActionTool {
    gateway: ActionGateway,
}

impl ActionTool {
    pub fn new(gateway: ActionGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for ActionTool {
    fn name(&self) -> &str {
        "ticket_action"
    }

    fn description(&self) -> &str {
        "Perform a ticket action from a natural-language command: claim, release, \
         change status or priority, or add a comment. The command must reference \
         the ticket by number, e.g. 'assign ticket #55 to me'."
    }

    async fn invoke(&self, input: &str, ctx: &CallContext) -> String {
        let request = match parser::parse(input) {
            Ok(r) => r,
            Err(e) => return error_payload(e.to_string()),
        };

        debug!(
            run_id = %ctx.run_id,
            action = request.kind(),
            number = request.number(),
            "Dispatching ticket action"
        );
        let result = self.gateway.apply(&request, &ctx.agent_id).await;

        let status = if result.success { "success" } else { "failed" };
        serde_json::json!({
            "status": status,
            "action": request.kind(),
            "number": request.number(),
            "message": result.message,
            "error": result.error,
            "ticket": result.ticket,
        })
        .to_string()
    }
}
