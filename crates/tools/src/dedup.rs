//! Duplicate-comment suppression.
//!
//! Retried tool calls can double-post the same comment. The cache
//! remembers recent (ticket, body) pairs for a short window and lets the
//! action gateway acknowledge the retry instead of inserting twice.
//!
//! The cache is injected behind a trait so a multi-instance deployment can
//! substitute a shared store; the in-process default does not survive
//! restarts and is per-instance only.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use deskhand_config::DedupConfig;

/// Time-bounded duplicate detection for comment submissions.
pub trait DedupCache: Send + Sync {
    /// Returns `true` when an identical (ticket, body) pair was recorded
    /// within the suppression window. Otherwise records the pair now.
    fn check_and_record(&self, ticket_number: u32, body: &str) -> bool;
}

/// In-process cache guarding against double-posting across concurrent
/// runs. Stale entries are purged opportunistically on access.
pub struct InMemoryDedupCache {
    window: Duration,
    purge_after: Duration,
    entries: Mutex<HashMap<(u32, String), Instant>>,
}

impl InMemoryDedupCache {
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_secs),
            purge_after: Duration::from_secs(config.purge_secs),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Construct with explicit durations. Handy for tests with short
    /// windows.
    pub fn with_durations(window: Duration, purge_after: Duration) -> Self {
        Self {
            window,
            purge_after,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live entries (test visibility).
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryDedupCache {
    fn default() -> Self {
        Self::new(&DedupConfig::default())
    }
}

impl DedupCache for InMemoryDedupCache {
    fn check_and_record(&self, ticket_number: u32, body: &str) -> bool {
        let now = Instant::now();
        let Ok(mut entries) = self.entries.lock() else {
            // Poisoned lock: fail open, a duplicate comment beats a panic.
            return false;
        };

        entries.retain(|_, seen| now.duration_since(*seen) < self.purge_after);

        let key = (ticket_number, body.to_string());
        match entries.get(&key) {
            Some(seen) if now.duration_since(*seen) < self.window => true,
            _ => {
                entries.insert(key, now);
                false
            }
        }
    }
}
