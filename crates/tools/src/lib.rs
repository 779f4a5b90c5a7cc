//! Agent capabilities for deskhand.
//!
//! Two tools are exposed to the orchestrator through the [`ToolRouter`]:
//! `ticket_search` (read-only semantic search over tickets and
//! knowledge-base articles) and `ticket_action` (validated mutating
//! transitions on a ticket, driven by a natural-language command parsed
//! by [`parser`]).

pub mod action;
pub mod dedup;
pub mod parser;
pub mod router;
pub mod search;

pub use action::{ActionGateway, ActionTool};
pub use dedup::{DedupCache, InMemoryDedupCache};
pub use router::ToolRouter;
pub use search::{SearchReply, SearchRequest, SearchTool};
