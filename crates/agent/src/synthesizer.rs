//! Response synthesis — turns raw tool outputs into one natural-language
//! reply plus structured sources and actions for UI display.
//!
//! Pure in-memory shaping: given the same inputs this always produces the
//! same response. Internal-only content is not redacted here; callers
//! serving unprivileged clients must filter before display.

use deskhand_config::SynthesisConfig;
use deskhand_core::response::{ActionRecord, AgentResponse, Source};
use deskhand_core::search::{HitKind, SearchHit};
use deskhand_core::ticket::{Ticket, TicketStatus};
use deskhand_tools::SearchReply;

/// Everything a run gathered, ready to be written up.
#[derive(Debug, Default)]
pub struct RunFindings {
    /// The directly referenced ticket, when one resolved.
    pub ticket: Option<Ticket>,
    /// A `#<number>` was referenced but no such ticket exists.
    pub missing_number: Option<u32>,
    /// Search results, when a search ran and succeeded.
    pub search: Option<SearchReply>,
    /// The action outcome, when an action ran: (kind, status, message).
    pub action: Option<(String, String, String)>,
}

/// Builds the final [`AgentResponse`] from a run's findings.
pub struct ResponseSynthesizer {
    config: SynthesisConfig,
}

impl ResponseSynthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn synthesize(&self, findings: &RunFindings, trace_id: &str) -> AgentResponse {
        let mut paragraphs: Vec<String> = Vec::new();
        let mut sources: Vec<Source> = Vec::new();
        let mut actions: Vec<ActionRecord> = Vec::new();

        if let Some(ticket) = &findings.ticket {
            paragraphs.push(format!(
                "Ticket #{} is about '{}'. {}",
                ticket.number,
                ticket.subject,
                status_phrase(ticket)
            ));
            sources.push(Source {
                kind: HitKind::Ticket,
                id: ticket.number.to_string(),
                title: ticket.subject.clone(),
                score: 1.0,
            });
        } else if let Some(number) = findings.missing_number {
            paragraphs.push(format!("I couldn't find a ticket #{number}."));
        }

        if let Some(search) = &findings.search {
            self.append_search(search, &mut paragraphs, &mut sources, findings);
        }

        if let Some((kind, status, message)) = &findings.action {
            let outcome = match status.as_str() {
                // Success messages and parse-level clarifications are
                // already complete sentences; failures get framed.
                "success" | "error" => message.clone(),
                _ => format!("The {kind} action did not go through: {message}"),
            };
            paragraphs.push(outcome);
            actions.push(ActionRecord {
                action_type: kind.clone(),
                status: status.clone(),
                details: message.clone(),
            });
        }

        if paragraphs.is_empty() {
            paragraphs.push(
                "I couldn't find anything relevant to that. Could you rephrase, or reference \
                 a ticket by number (like #123)?"
                    .into(),
            );
        }

        let kind = response_kind(findings);
        AgentResponse {
            content: paragraphs.join("\n\n"),
            kind: kind.into(),
            sources,
            actions,
            trace_id: trace_id.into(),
        }
    }

    fn append_search(
        &self,
        search: &SearchReply,
        paragraphs: &mut Vec<String>,
        sources: &mut Vec<Source>,
        findings: &RunFindings,
    ) {
        let articles: Vec<&SearchHit> = search
            .articles
            .iter()
            .filter(|h| h.score >= self.config.article_floor)
            .take(self.config.max_article_snippets)
            .collect();
        let anchor_number = findings.ticket.as_ref().map(|t| t.number.to_string());
        let tickets: Vec<&SearchHit> = search
            .tickets
            .iter()
            .filter(|h| h.score >= self.config.ticket_floor)
            .filter(|h| Some(&h.id) != anchor_number.as_ref())
            .take(self.config.max_ticket_mentions)
            .collect();

        if !articles.is_empty() {
            let mut lines = vec!["From the knowledge base:".to_string()];
            for hit in &articles {
                lines.push(format!("- {}: {}", hit.title, hit.excerpt));
            }
            paragraphs.push(lines.join("\n"));
        }

        if !tickets.is_empty() {
            let mentions: Vec<String> = tickets
                .iter()
                .map(|h| format!("#{} ('{}')", h.id, h.title))
                .collect();
            paragraphs.push(format!("Similar past tickets: {}.", mentions.join(", ")));
        }

        if articles.is_empty() && tickets.is_empty() && findings.ticket.is_none() {
            paragraphs.push("I didn't find any closely related tickets or articles.".into());
        }

        for hit in articles.into_iter().chain(tickets) {
            sources.push(Source::from(hit));
        }
    }
}

fn status_phrase(ticket: &Ticket) -> String {
    match ticket.status {
        TicketStatus::New => "The ticket is still unassigned in the queue.".into(),
        TicketStatus::InProgress => match &ticket.assignee {
            Some(assignee) => format!("The ticket is in progress with {assignee}."),
            None => "The ticket is in progress.".into(),
        },
        TicketStatus::Resolved => "The ticket is resolved and awaiting confirmation.".into(),
        TicketStatus::Closed => "The ticket is closed.".into(),
        TicketStatus::Cancelled => "The ticket was cancelled.".into(),
    }
}

fn response_kind(findings: &RunFindings) -> &'static str {
    match (&findings.action, &findings.search, &findings.ticket) {
        // A command that couldn't even be parsed is a request to rephrase.
        (Some((_, status, _)), None, None) if status == "error" => "clarification",
        (Some(_), _, _) => "action",
        (None, Some(_), _) | (None, None, Some(_)) => "answer",
        _ => "clarification",
    }
}
