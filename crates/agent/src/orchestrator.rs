//! The agent loop — one inbound message in, one structured response out.
//!
//! States: Start → Classify → (Search?) → (Act?) → Synthesize → End, with
//! Error reachable from any step. Within a run everything is sequential
//! except the search gateway's two sub-queries; across runs there is no
//! ordering at all.
//!
//! Given the same message and the same gateway replies, the orchestrator
//! produces the same response — the freshly minted run id is the only
//! nondeterminism.

use std::sync::Arc;

use deskhand_config::AppConfig;
use deskhand_core::error::{Error, StoreError};
use deskhand_core::response::AgentResponse;
use deskhand_core::store::RecordStore;
use deskhand_core::tool::CallContext;
use deskhand_core::trace::{RunEvent, Tracer};
use deskhand_core::search::SemanticSearch;
use deskhand_tools::{
    ActionGateway, ActionTool, InMemoryDedupCache, SearchReply, SearchRequest, SearchTool,
    ToolRouter,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier;
use crate::synthesizer::{ResponseSynthesizer, RunFindings};

const SEARCH_TOOL: &str = "ticket_search";
const ACTION_TOOL: &str = "ticket_action";

/// The top-level driver of one agent run.
pub struct Orchestrator {
    router: Arc<ToolRouter>,
    store: Arc<dyn RecordStore>,
    tracer: Arc<dyn Tracer>,
    synthesizer: ResponseSynthesizer,
}

impl Orchestrator {
    pub fn new(
        router: Arc<ToolRouter>,
        store: Arc<dyn RecordStore>,
        tracer: Arc<dyn Tracer>,
        config: &AppConfig,
    ) -> Self {
        Self {
            router,
            store,
            tracer,
            synthesizer: ResponseSynthesizer::new(config.synthesis.clone()),
        }
    }

    /// Wire up an orchestrator with the standard two capabilities
    /// (ticket_search, ticket_action) over the given backends.
    pub fn with_default_tools(
        store: Arc<dyn RecordStore>,
        search: Arc<dyn SemanticSearch>,
        tracer: Arc<dyn Tracer>,
        config: &AppConfig,
    ) -> Self {
        let dedup = Arc::new(InMemoryDedupCache::new(&config.dedup));
        let mut router = ToolRouter::new();
        router.register(Arc::new(SearchTool::new(
            search,
            store.clone(),
            config.search.clone(),
        )));
        router.register(Arc::new(ActionTool::new(ActionGateway::new(
            store.clone(),
            dedup,
        ))));
        Self::new(Arc::new(router), store, tracer, config)
    }

    /// Process one operator message and produce the run's response.
    ///
    /// Never panics and never surfaces a raw error: any unexpected failure
    /// is traced and converted to the standard fallback response, with the
    /// trace id preserved for investigation.
    pub async fn run(&self, message: &str, agent_id: &str) -> AgentResponse {
        let run_id = Uuid::new_v4().to_string();
        let ctx = CallContext::new(&run_id, agent_id);

        info!(run_id = %run_id, agent_id, "Starting agent run");
        self.tracer.record(
            &run_id,
            RunEvent::ChainStart {
                message: message.to_string(),
            },
        );

        match self.execute(message, &ctx).await {
            Ok(findings) => {
                let response = self.synthesizer.synthesize(&findings, &run_id);
                self.tracer.record(
                    &run_id,
                    RunEvent::ChainEnd {
                        response_kind: response.kind.clone(),
                    },
                );
                response
            }
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Agent run failed, returning fallback");
                self.tracer.record_error(&run_id, &e.to_string());
                AgentResponse::fallback(run_id)
            }
        }
    }

    /// Classify → Search? → Act?. Tool-level failures degrade the run;
    /// only store transport failures abort it into the fallback path.
    async fn execute(&self, message: &str, ctx: &CallContext) -> Result<RunFindings, Error> {
        let intent = classifier::classify(message);
        debug!(
            run_id = %ctx.run_id,
            ticket = ?intent.ticket_number,
            needs_search = intent.needs_search,
            needs_action = intent.needs_action,
            "Classified message"
        );

        let mut findings = RunFindings::default();

        if let Some(number) = intent.ticket_number {
            match self.store.get_by_number(number).await {
                Ok(Some(ticket)) => findings.ticket = Some(ticket),
                // With an action pending, the gateway reports the missing
                // ticket itself; saying it twice reads badly.
                Ok(None) if !intent.needs_action => findings.missing_number = Some(number),
                Ok(None) => {}
                Err(e @ StoreError::Backend(_)) => return Err(e.into()),
                Err(e) => {
                    warn!(run_id = %ctx.run_id, number, error = %e, "Ticket lookup failed");
                }
            }
        }

        if intent.needs_search {
            findings.search = self.search_step(message, &findings, ctx).await;
        }

        // The action step always runs when flagged, even after a search —
        // and never before classification.
        if intent.needs_action {
            findings.action = Some(self.action_step(message, ctx).await);
        }

        Ok(findings)
    }

    /// Dispatch the search tool. A degraded (error) reply is tolerated:
    /// the run continues without search results.
    async fn search_step(
        &self,
        message: &str,
        findings: &RunFindings,
        ctx: &CallContext,
    ) -> Option<SearchReply> {
        let input = match &findings.ticket {
            Some(ticket) => {
                let request = SearchRequest {
                    query: message.to_string(),
                    ticket_number: Some(ticket.number),
                };
                serde_json::to_string(&request).unwrap_or_else(|_| message.to_string())
            }
            None => message.to_string(),
        };

        let output = self.dispatch_traced(SEARCH_TOOL, &input, ctx).await;
        match serde_json::from_str::<SearchReply>(&output) {
            Ok(reply) if reply.status != "error" => Some(reply),
            Ok(_) | Err(_) => {
                warn!(run_id = %ctx.run_id, "Search degraded, continuing without results");
                None
            }
        }
    }

    /// Dispatch the action tool and reduce its JSON reply to the
    /// (kind, status, message) triple synthesis needs.
    async fn action_step(&self, message: &str, ctx: &CallContext) -> (String, String, String) {
        let output = self.dispatch_traced(ACTION_TOOL, message, ctx).await;

        match serde_json::from_str::<serde_json::Value>(&output) {
            Ok(v) => {
                let kind = v["action"].as_str().unwrap_or("command").to_string();
                let status = v["status"].as_str().unwrap_or("error").to_string();
                let message = v["message"]
                    .as_str()
                    .unwrap_or("The action could not be completed.")
                    .to_string();
                (kind, status, message)
            }
            Err(e) => {
                warn!(run_id = %ctx.run_id, error = %e, "Unparseable action reply");
                (
                    "command".into(),
                    "error".into(),
                    "The action could not be completed.".into(),
                )
            }
        }
    }

    async fn dispatch_traced(&self, tool: &str, input: &str, ctx: &CallContext) -> String {
        self.tracer.record(
            &ctx.run_id,
            RunEvent::ToolCall {
                tool: tool.to_string(),
                input: input.to_string(),
            },
        );
        let output = self.router.dispatch(tool, input, ctx).await;
        self.tracer.record(
            &ctx.run_id,
            RunEvent::ToolResult {
                tool: tool.to_string(),
                output: output.clone(),
            },
        );
        output
    }
}
