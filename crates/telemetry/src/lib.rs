//! Run tracing for deskhand agent runs.
//!
//! The [`TraceRecorder`] implements [`deskhand_core::Tracer`] and keeps an
//! append-only trace per run: chain start, every tool call and result, and
//! the terminal end or error event. Strictly side-effect-only.

pub mod model;
pub mod recorder;

pub use model::RunTrace;
pub use recorder::TraceRecorder;
