//! Thread-safe trace recorder — collects run traces for observability.
//!
//! Recording is side-effect-only: nothing in here influences control flow,
//! and the [`Tracer`] implementation swallows its own failures (a poisoned
//! lock is logged, never propagated into the run).

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use deskhand_core::trace::{RunEvent, Tracer};
use tracing::{debug, warn};

use crate::model::RunTrace;

/// In-process recorder of agent run traces.
///
/// Thread-safe via `RwLock`; runs are appended as their first event
/// arrives and auto-pruned when too many finished runs accumulate.
pub struct TraceRecorder {
    runs: RwLock<Vec<RunTrace>>,
}

/// Cap on retained runs; the oldest finished runs are dropped first.
const MAX_RUNS: usize = 5_000;

impl TraceRecorder {
    pub fn new() -> Self {
        Self {
            runs: RwLock::new(Vec::new()),
        }
    }

    /// Get a specific run by id.
    pub fn get_run(&self, run_id: &str) -> Option<RunTrace> {
        let runs = self.runs.read().ok()?;
        runs.iter().find(|r| r.run_id == run_id).cloned()
    }

    /// List recent runs (most recent first).
    pub fn recent_runs(&self, limit: usize) -> Vec<RunTrace> {
        match self.runs.read() {
            Ok(runs) => runs.iter().rev().take(limit).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of retained runs.
    pub fn run_count(&self) -> usize {
        self.runs.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Drop runs that started before `cutoff`. Returns how many were
    /// removed.
    pub fn prune_before(&self, cutoff: DateTime<Utc>) -> usize {
        let Ok(mut runs) = self.runs.write() else {
            return 0;
        };
        let before = runs.len();
        runs.retain(|r| r.started_at >= cutoff);
        before - runs.len()
    }

    fn append(&self, run_id: &str, event: RunEvent) {
        let Ok(mut runs) = self.runs.write() else {
            warn!(run_id, "Trace store lock poisoned, dropping event");
            return;
        };

        if runs.len() >= MAX_RUNS {
            let drain_target = MAX_RUNS / 10;
            let mut removed = 0;
            runs.retain(|r| {
                if removed >= drain_target || !r.is_finished() {
                    return true;
                }
                removed += 1;
                false
            });
        }

        match runs.iter_mut().find(|r| r.run_id == run_id) {
            Some(run) => run.push(event),
            None => {
                let mut run = RunTrace::new(run_id);
                run.push(event);
                runs.push(run);
            }
        }
    }
}

impl Default for TraceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer for TraceRecorder {
    fn record(&self, run_id: &str, event: RunEvent) {
        debug!(run_id, event = event.label(), "Run event");
        self.append(run_id, event);
    }

    fn record_error(&self, run_id: &str, error: &str) {
        debug!(run_id, error, "Run error");
        self.append(
            run_id,
            RunEvent::ChainError {
                error: error.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_accumulate_per_run() {
        let recorder = TraceRecorder::new();
        recorder.record("run-1", RunEvent::ChainStart { message: "hi".into() });
        recorder.record(
            "run-1",
            RunEvent::ToolCall { tool: "ticket_search".into(), input: "q".into() },
        );
        recorder.record("run-2", RunEvent::ChainStart { message: "yo".into() });

        assert_eq!(recorder.run_count(), 2);
        let run = recorder.get_run("run-1").unwrap();
        assert_eq!(run.events.len(), 2);
        assert_eq!(run.tool_call_count(), 1);
    }

    #[test]
    fn record_error_closes_the_run() {
        let recorder = TraceRecorder::new();
        recorder.record("run-1", RunEvent::ChainStart { message: "hi".into() });
        recorder.record_error("run-1", "backend exploded");

        let run = recorder.get_run("run-1").unwrap();
        assert!(run.is_finished());
        assert_eq!(run.error.as_deref(), Some("backend exploded"));
    }

    #[test]
    fn recent_runs_are_newest_first() {
        let recorder = TraceRecorder::new();
        for i in 0..5 {
            recorder.record(
                &format!("run-{i}"),
                RunEvent::ChainStart { message: String::new() },
            );
        }
        let recent = recorder.recent_runs(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].run_id, "run-4");
        assert_eq!(recent[1].run_id, "run-3");
    }

    #[test]
    fn prune_before_removes_old_runs() {
        let recorder = TraceRecorder::new();
        recorder.record("run-1", RunEvent::ChainStart { message: String::new() });
        assert_eq!(recorder.run_count(), 1);

        let pruned = recorder.prune_before(Utc::now() + chrono::Duration::hours(1));
        assert_eq!(pruned, 1);
        assert_eq!(recorder.run_count(), 0);
    }

    #[test]
    fn unknown_run_is_created_on_first_event() {
        let recorder = TraceRecorder::new();
        recorder.record(
            "fresh",
            RunEvent::ToolResult { tool: "t".into(), output: "{}".into() },
        );
        assert!(recorder.get_run("fresh").is_some());
    }
}
