//! Tool trait — the dispatch contract between the orchestrator and the
//! two agent capabilities (search, action).
//!
//! Every tool call is a single string in and a single JSON string out, so
//! calls are uniformly loggable and replayable regardless of which gateway
//! served them. A tool never panics and never returns an `Err` across this
//! boundary: malformed input and backend failures both come back as a
//! structured `{"status":"error","message":...}` payload, letting the
//! orchestration loop continue with a degraded result instead of aborting
//! the run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Per-run context that travels alongside the string payload.
///
/// The payload stays a plain string (the natural-language surface a
/// language-model caller would emit); caller identity and the run id are
/// ambient, not encoded into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallContext {
    /// Opaque run identifier, used for tracing.
    pub run_id: String,
    /// The acting agent — ownership checks are made against this identity.
    pub agent_id: String,
}

impl CallContext {
    pub fn new(run_id: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            agent_id: agent_id.into(),
        }
    }
}

/// The agent capability contract.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g. "ticket_search").
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// Invoke the tool. `input` is a single request string; the return
    /// value is always a JSON document, error payloads included.
    async fn invoke(&self, input: &str, ctx: &CallContext) -> String;
}

/// Build the structured error payload tools return instead of throwing.
pub fn error_payload(message: impl Into<String>) -> String {
    serde_json::json!({
        "status": "error",
        "message": message.into(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_payload_is_structured() {
        let payload = error_payload("backend unreachable");
        let v: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["message"], "backend unreachable");
    }
}
