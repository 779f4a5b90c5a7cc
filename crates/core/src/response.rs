//! The agent's externally visible output shape.
//!
//! An [`AgentResponse`] is the sole artifact of a run: natural-language
//! content plus structured sources and actions for UI display, and the
//! opaque trace id tying the run to its recorded events.

use serde::{Deserialize, Serialize};

use crate::search::{HitKind, SearchHit};

/// A source the reply drew on — the resolved ticket or a search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Content type.
    pub kind: HitKind,
    /// Ticket number or article id.
    pub id: String,
    /// Title or subject line.
    pub title: String,
    /// Similarity score, 1.0 for the directly resolved ticket.
    pub score: f32,
}

impl From<&SearchHit> for Source {
    fn from(hit: &SearchHit) -> Self {
        Self {
            kind: hit.kind,
            id: hit.id.clone(),
            title: hit.title.clone(),
            score: hit.score,
        }
    }
}

/// One action the agent took (or attempted) during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Action label, e.g. "claim", "set_status".
    pub action_type: String,
    /// "success", "failed", or "error".
    pub status: String,
    /// Human-readable outcome detail.
    pub details: String,
}

/// The final structured output of one agent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Natural-language reply for the operator.
    pub content: String,

    /// Response category: "answer", "action", "clarification", or "error".
    #[serde(rename = "type")]
    pub kind: String,

    /// Sources the reply references.
    #[serde(default)]
    pub sources: Vec<Source>,

    /// Actions taken during the run.
    #[serde(default)]
    pub actions: Vec<ActionRecord>,

    /// Opaque run identifier for trace lookup.
    pub trace_id: String,
}

impl AgentResponse {
    /// The safe fallback returned when a run errors internally. Keeps the
    /// trace id so the failure can be investigated, exposes no raw error.
    pub fn fallback(trace_id: impl Into<String>) -> Self {
        Self {
            content: "I apologize, but I encountered an error while processing your request. \
                      Please try again or rephrase your message."
                .into(),
            kind: "error".into(),
            sources: Vec::new(),
            actions: Vec::new(),
            trace_id: trace_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_serializes_type_field() {
        let resp = AgentResponse {
            content: "Done.".into(),
            kind: "action".into(),
            sources: vec![],
            actions: vec![],
            trace_id: "run-1".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["type"], "action");
        assert_eq!(json["trace_id"], "run-1");
    }

    #[test]
    fn fallback_preserves_trace_id() {
        let resp = AgentResponse::fallback("run-9");
        assert_eq!(resp.kind, "error");
        assert_eq!(resp.trace_id, "run-9");
        assert!(resp.content.contains("apologize"));
        assert!(resp.sources.is_empty());
    }

    #[test]
    fn source_from_hit_copies_fields() {
        let hit = SearchHit {
            kind: HitKind::Article,
            id: "kb-3".into(),
            title: "Password policy".into(),
            excerpt: "…".into(),
            score: 0.72,
        };
        let src = Source::from(&hit);
        assert_eq!(src.id, "kb-3");
        assert!((src.score - 0.72).abs() < f32::EPSILON);
    }
}
