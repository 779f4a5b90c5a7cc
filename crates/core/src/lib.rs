//! # deskhand Core
//!
//! Domain types, collaborator traits, and error definitions for the
//! deskhand support-agent core. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (ticket storage, semantic search, tracing)
//! is defined as a trait here. Implementations live in their respective
//! crates. This enables:
//! - Swapping backends without touching the agent core
//! - Easy testing with mock/in-memory implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod action;
pub mod error;
pub mod response;
pub mod search;
pub mod store;
pub mod ticket;
pub mod tool;
pub mod trace;

// Re-export key types at crate root for ergonomics
pub use action::{ActionRequest, ActionResult};
pub use error::{Error, ParseError, Result, SearchError, StoreError, ValidationError};
pub use response::{ActionRecord, AgentResponse, Source};
pub use search::{HitKind, ScoredMatch, SearchHit, SemanticSearch};
pub use store::RecordStore;
pub use ticket::{AuditEntry, Comment, Ticket, TicketPatch, TicketPriority, TicketStatus};
pub use tool::{CallContext, Tool, error_payload};
pub use trace::{NoopTracer, RunEvent, TracedEvent, Tracer};
