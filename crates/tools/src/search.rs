//! Semantic search gateway — the read-only agent capability.
//!
//! Accepts either plain free text or a record-anchored request (the
//! anchored ticket's subject and description are folded into the query
//! before embedding). The two backend indexes (historical tickets,
//! knowledge-base articles) are queried concurrently; both must complete
//! before results are reported.

use std::sync::Arc;

use async_trait::async_trait;
use deskhand_config::SearchConfig;
use deskhand_core::search::{HitKind, SearchHit, SemanticSearch};
use deskhand_core::store::RecordStore;
use deskhand_core::tool::{CallContext, Tool, error_payload};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The anchored-search request shape. Plain text input is equivalent to
/// `{"query": <text>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<u32>,
}

/// The search gateway's reply. Empty lists with status `no_results` is a
/// valid outcome, distinct from a backend failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReply {
    pub status: String,
    pub tickets: Vec<SearchHit>,
    pub articles: Vec<SearchHit>,
}

/// The search capability exposed to the orchestrator.
pub struct SearchTool {
    search: Arc<dyn SemanticSearch>,
    store: Arc<dyn RecordStore>,
    config: SearchConfig,
}

impl SearchTool {
    pub fn new(
        search: Arc<dyn SemanticSearch>,
        store: Arc<dyn RecordStore>,
        config: SearchConfig,
    ) -> Self {
        Self {
            search,
            store,
            config,
        }
    }

    /// Run a search, optionally anchored to a known ticket.
    pub async fn run(&self, request: &SearchRequest) -> Result<SearchReply, String> {
        let mut query_text = request.query.clone();

        if let Some(number) = request.ticket_number {
            match self.store.get_by_number(number).await {
                Ok(Some(ticket)) => {
                    // Context-anchored search: the ticket's own text leads.
                    query_text = format!("{} {}", ticket.search_text(), request.query);
                }
                Ok(None) => {
                    debug!(number, "Anchor ticket not found, searching with raw query");
                }
                Err(e) => {
                    warn!(number, error = %e, "Anchor lookup failed, searching with raw query");
                }
            }
        }

        let vector = self
            .search
            .embed(&query_text)
            .await
            .map_err(|e| format!("search backend error: {e}"))?;

        // The two sub-queries are independent and read-only; run them
        // concurrently, but report nothing until both complete.
        let (tickets, articles) = tokio::join!(
            self.search.query_tickets(&vector, self.config.result_limit),
            self.search.query_articles(&vector, self.config.result_limit),
        );
        let tickets = tickets.map_err(|e| format!("ticket index error: {e}"))?;
        let articles = articles.map_err(|e| format!("article index error: {e}"))?;

        let tickets: Vec<SearchHit> = tickets
            .into_iter()
            .map(|m| m.into_hit(HitKind::Ticket, self.config.excerpt_len))
            .collect();
        let articles: Vec<SearchHit> = articles
            .into_iter()
            .map(|m| m.into_hit(HitKind::Article, self.config.excerpt_len))
            .collect();

        let status = if tickets.is_empty() && articles.is_empty() {
            "no_results"
        } else {
            "ok"
        };

        Ok(SearchReply {
            status: status.into(),
            tickets,
            articles,
        })
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "ticket_search"
    }

    fn description(&self) -> &str {
        "Search historical tickets and knowledge-base articles. Input is free text, \
         or a JSON object {\"query\": ..., \"ticket_number\": N} to anchor the search \
         to a known ticket."
    }

    async fn invoke(&self, input: &str, ctx: &CallContext) -> String {
        // Accept both call shapes: a JSON envelope or bare free text.
        let request = serde_json::from_str::<SearchRequest>(input).unwrap_or_else(|_| SearchRequest {
            query: input.to_string(),
            ticket_number: None,
        });

        if request.query.trim().is_empty() {
            return error_payload("The search query is empty.");
        }

        debug!(
            run_id = %ctx.run_id,
            anchored = request.ticket_number.is_some(),
            "Dispatching search"
        );

        match self.run(&request).await {
            Ok(reply) => serde_json::to_string(&reply)
                .unwrap_or_else(|e| error_payload(format!("failed to encode reply: {e}"))),
            Err(message) => {
                warn!(run_id = %ctx.run_id, error = %message, "Search failed");
                error_payload(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskhand_core::error::SearchError;
    use deskhand_core::search::ScoredMatch;
    use deskhand_core::ticket::Ticket;
    use deskhand_store::{InMemorySearchIndex, InMemoryTicketStore};

    fn ctx() -> CallContext {
        CallContext::new("run-test", "alice")
    }

    async fn fixture() -> (Arc<InMemoryTicketStore>, Arc<InMemorySearchIndex>, SearchTool) {
        let store = Arc::new(InMemoryTicketStore::new());
        let index = Arc::new(InMemorySearchIndex::new());
        let tool = SearchTool::new(index.clone(), store.clone(), SearchConfig::default());
        (store, index, tool)
    }

    #[tokio::test]
    async fn plain_text_search_returns_both_lists() {
        let (_store, index, tool) = fixture().await;
        index
            .index_article("kb-1", "VPN setup guide", "How to configure the VPN client")
            .await;
        index
            .index_ticket(&Ticket::new(7, "VPN not connecting", "VPN client fails to connect"))
            .await;

        let out = tool.invoke("vpn client connection problems", &ctx()).await;
        let reply: SearchReply = serde_json::from_str(&out).unwrap();
        assert_eq!(reply.status, "ok");
        assert_eq!(reply.articles[0].id, "kb-1");
        assert_eq!(reply.tickets[0].id, "7");
    }

    #[tokio::test]
    async fn zero_matches_is_no_results_not_error() {
        let (_store, _index, tool) = fixture().await;

        let out = tool.invoke("anything at all", &ctx()).await;
        let reply: SearchReply = serde_json::from_str(&out).unwrap();
        assert_eq!(reply.status, "no_results");
        assert!(reply.tickets.is_empty());
        assert!(reply.articles.is_empty());
    }

    #[tokio::test]
    async fn anchored_search_uses_ticket_text() {
        let (store, index, tool) = fixture().await;
        let anchor = Ticket::new(101, "Login issue", "User cannot log in to the portal");
        store.insert_ticket(anchor).await;
        index
            .index_article("kb-9", "Portal login troubleshooting", "Steps when a user cannot log in to the portal")
            .await;

        // The raw query alone shares no terms with the article; the anchor
        // ticket's text is what finds it.
        let input = serde_json::json!({"query": "similar", "ticket_number": 101}).to_string();
        let out = tool.invoke(&input, &ctx()).await;
        let reply: SearchReply = serde_json::from_str(&out).unwrap();
        assert_eq!(reply.status, "ok");
        assert_eq!(reply.articles[0].id, "kb-9");
    }

    #[tokio::test]
    async fn missing_anchor_degrades_to_raw_query() {
        let (_store, index, tool) = fixture().await;
        index
            .index_article("kb-1", "Printer guide", "Fixing printer paper jams")
            .await;

        let input = serde_json::json!({"query": "printer paper jams", "ticket_number": 999}).to_string();
        let out = tool.invoke(&input, &ctx()).await;
        let reply: SearchReply = serde_json::from_str(&out).unwrap();
        assert_eq!(reply.status, "ok");
    }

    #[tokio::test]
    async fn empty_query_is_a_structured_error() {
        let (_store, _index, tool) = fixture().await;
        let out = tool.invoke("   ", &ctx()).await;
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "error");
    }

    /// A backend that always fails, for the transport-error path.
    struct BrokenSearch;

    #[async_trait]
    impl SemanticSearch for BrokenSearch {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, SearchError> {
            Err(SearchError::Unreachable("connection refused".into()))
        }
        async fn query_tickets(&self, _v: &[f32], _l: usize) -> Result<Vec<ScoredMatch>, SearchError> {
            Err(SearchError::Unreachable("connection refused".into()))
        }
        async fn query_articles(&self, _v: &[f32], _l: usize) -> Result<Vec<ScoredMatch>, SearchError> {
            Err(SearchError::Unreachable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn backend_failure_is_error_status() {
        let store = Arc::new(InMemoryTicketStore::new());
        let tool = SearchTool::new(Arc::new(BrokenSearch), store, SearchConfig::default());

        let out = tool.invoke("anything", &ctx()).await;
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "error");
        assert!(v["message"].as_str().unwrap().contains("search backend"));
    }
}
