//! Run tracing contract — side-effect-only observability.
//!
//! A tracer observes every transition of a run without influencing it.
//! The trait is infallible on purpose: recording must never throw back
//! into the orchestrator, whatever the backing store does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One append-only event in a run's trace. Write-once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// The run started with the given inbound message.
    ChainStart { message: String },

    /// A tool is about to be invoked.
    ToolCall { tool: String, input: String },

    /// A tool returned.
    ToolResult { tool: String, output: String },

    /// The run completed normally.
    ChainEnd { response_kind: String },

    /// The run failed; the fallback response was returned.
    ChainError { error: String },
}

impl RunEvent {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChainStart { .. } => "chain_start",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::ChainEnd { .. } => "chain_end",
            Self::ChainError { .. } => "chain_error",
        }
    }
}

/// A recorded event with its timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracedEvent {
    pub event: RunEvent,
    pub at: DateTime<Utc>,
}

impl TracedEvent {
    pub fn now(event: RunEvent) -> Self {
        Self {
            event,
            at: Utc::now(),
        }
    }
}

/// The observability collaborator. Implementations must swallow their own
/// failures; both methods are deliberately infallible at this boundary.
pub trait Tracer: Send + Sync {
    /// Record one event against a run.
    fn record(&self, run_id: &str, event: RunEvent);

    /// Record a run-level error.
    fn record_error(&self, run_id: &str, error: &str);
}

/// A tracer that discards everything. Useful for tests and callers that
/// opt out of observability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn record(&self, _run_id: &str, _event: RunEvent) {}
    fn record_error(&self, _run_id: &str, _error: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_labels_are_stable() {
        assert_eq!(RunEvent::ChainStart { message: String::new() }.label(), "chain_start");
        assert_eq!(RunEvent::ChainError { error: String::new() }.label(), "chain_error");
    }

    #[test]
    fn event_serializes_with_tag() {
        let e = RunEvent::ToolCall {
            tool: "ticket_search".into(),
            input: "vpn".into(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["event"], "tool_call");
        assert_eq!(json["tool"], "ticket_search");
    }

    #[test]
    fn noop_tracer_accepts_everything() {
        let t = NoopTracer;
        t.record("run-1", RunEvent::ChainEnd { response_kind: "answer".into() });
        t.record_error("run-1", "boom");
    }
}
