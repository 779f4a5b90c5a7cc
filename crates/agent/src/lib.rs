//! # deskhand Agent
//!
//! The conversational agent loop: classify an operator message, invoke
//! the search and/or action capabilities through the tool router, and
//! synthesize one structured response.
//!
//! The loop is a deterministic orchestration shell — keyword/regex
//! classification and pattern-based command parsing. A richer
//! language-understanding step can replace either behind the same seams
//! without touching the orchestration.

pub mod classifier;
pub mod orchestrator;
pub mod synthesizer;

pub use classifier::{Intent, classify};
pub use orchestrator::Orchestrator;
pub use synthesizer::{ResponseSynthesizer, RunFindings};
