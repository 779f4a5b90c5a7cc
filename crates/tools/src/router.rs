//! Tool router — the dispatch layer between the orchestrator and the two
//! agent capabilities.
//!
//! Every capability goes through the same string-in/JSON-string-out
//! contract, so calls are uniformly loggable and replayable whichever
//! gateway serves them. Dispatching an unknown tool name yields the
//! structured error payload, never a panic.

use std::collections::HashMap;
use std::sync::Arc;

use deskhand_core::tool::{CallContext, Tool, error_payload};
use tracing::debug;

/// A registry of the agent's callable capabilities.
#[derive(Default)]
pub struct ToolRouter {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// List registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// (name, description) pairs for all registered tools.
    pub fn descriptions(&self) -> Vec<(String, String)> {
        self.tools
            .values()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect()
    }

    /// Dispatch one call. The reply is always a JSON string, including the
    /// unknown-tool case.
    pub async fn dispatch(&self, name: &str, input: &str, ctx: &CallContext) -> String {
        let Some(tool) = self.tools.get(name) else {
            return error_payload(format!("Unknown tool: {name}"));
        };
        debug!(run_id = %ctx.run_id, tool = name, "Dispatching tool call");
        tool.invoke(input, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        async fn invoke(&self, input: &str, _ctx: &CallContext) -> String {
            serde_json::json!({"status": "ok", "echo": input}).to_string()
        }
    }

    fn ctx() -> CallContext {
        CallContext::new("run-test", "alice")
    }

    #[tokio::test]
    async fn register_and_dispatch() {
        let mut router = ToolRouter::new();
        router.register(Arc::new(EchoTool));
        assert!(router.get("echo").is_some());

        let out = router.dispatch("echo", "hello", &ctx()).await;
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["echo"], "hello");
    }

    #[tokio::test]
    async fn unknown_tool_is_structured_error() {
        let router = ToolRouter::new();
        let out = router.dispatch("nonexistent", "x", &ctx()).await;
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "error");
        assert!(v["message"].as_str().unwrap().contains("nonexistent"));
    }

    #[tokio::test]
    async fn descriptions_cover_registered_tools() {
        let mut router = ToolRouter::new();
        router.register(Arc::new(EchoTool));
        let descriptions = router.descriptions();
        assert_eq!(descriptions.len(), 1);
        assert_eq!(descriptions[0].0, "echo");
    }
}
