//! Data model for recorded agent runs.

use chrono::{DateTime, Utc};
use deskhand_core::trace::{RunEvent, TracedEvent};
use serde::{Deserialize, Serialize};

/// The append-only record of one agent run.
///
/// Events are write-once: they are appended as the run progresses and
/// never mutated afterwards. Read only by observability tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTrace {
    /// The run's opaque identifier (matches `AgentResponse.trace_id`).
    pub run_id: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run ended (None while in flight).
    pub ended_at: Option<DateTime<Utc>>,
    /// Events in arrival order.
    pub events: Vec<TracedEvent>,
    /// The run-level error, when the run failed.
    pub error: Option<String>,
}

impl RunTrace {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Utc::now(),
            ended_at: None,
            events: Vec::new(),
            error: None,
        }
    }

    /// Append one event; terminal events close the run.
    pub fn push(&mut self, event: RunEvent) {
        let terminal = matches!(event, RunEvent::ChainEnd { .. } | RunEvent::ChainError { .. });
        if let RunEvent::ChainError { error } = &event {
            self.error = Some(error.clone());
        }
        self.events.push(TracedEvent::now(event));
        if terminal {
            self.ended_at = Some(Utc::now());
        }
    }

    /// Number of tool calls recorded in this run.
    pub fn tool_call_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.event, RunEvent::ToolCall { .. }))
            .count()
    }

    /// Whether the run has ended (normally or with an error).
    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_records_in_order() {
        let mut trace = RunTrace::new("run-1");
        trace.push(RunEvent::ChainStart { message: "hi".into() });
        trace.push(RunEvent::ToolCall { tool: "ticket_search".into(), input: "q".into() });
        trace.push(RunEvent::ToolResult { tool: "ticket_search".into(), output: "{}".into() });

        assert_eq!(trace.events.len(), 3);
        assert_eq!(trace.tool_call_count(), 1);
        assert!(!trace.is_finished());
    }

    #[test]
    fn chain_end_closes_the_run() {
        let mut trace = RunTrace::new("run-1");
        trace.push(RunEvent::ChainEnd { response_kind: "answer".into() });
        assert!(trace.is_finished());
        assert!(trace.error.is_none());
    }

    #[test]
    fn chain_error_captures_the_error() {
        let mut trace = RunTrace::new("run-1");
        trace.push(RunEvent::ChainError { error: "boom".into() });
        assert!(trace.is_finished());
        assert_eq!(trace.error.as_deref(), Some("boom"));
    }
}
