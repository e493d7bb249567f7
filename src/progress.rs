/*!
 * Process-wide translation progress store.
 *
 * Maps caller-chosen progress ids to batch counters. Executor workers
 * advance the completed count as batches finish (success or failure);
 * an external status reader polls `snapshot`. The engine never cancels
 * itself: stuck detection is the reader's job, via `is_stuck` and the
 * configured threshold. Finished records linger for a grace period so
 * late polls still resolve, then `sweep` drops them.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Grace period before a finished record may be garbage-collected
pub const DEFAULT_LINGER: Duration = Duration::from_secs(300);

/// Snapshot returned to status readers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressRecord {
    pub total_batches: usize,
    pub completed_batches: usize,
    pub error: bool,
}

#[derive(Debug)]
struct ProgressEntry {
    total_batches: usize,
    completed_batches: usize,
    error: bool,
    last_advance: Instant,
    finished_at: Option<Instant>,
}

/// Shared store, cheap to clone into workers and handlers
#[derive(Clone, Default)]
pub struct ProgressStore {
    inner: Arc<Mutex<HashMap<String, ProgressEntry>>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ProgressEntry>> {
        // A poisoned lock only means a worker panicked mid-update;
        // the counters themselves are still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a request with its total batch count
    pub fn begin(&self, id: &str, total_batches: usize) {
        let mut map = self.lock();
        map.insert(
            id.to_string(),
            ProgressEntry {
                total_batches,
                completed_batches: 0,
                error: false,
                last_advance: Instant::now(),
                finished_at: None,
            },
        );
    }

    /// Record one completed batch (success or failure)
    pub fn advance(&self, id: &str) {
        let mut map = self.lock();
        if let Some(entry) = map.get_mut(id) {
            entry.completed_batches += 1;
            entry.last_advance = Instant::now();
        }
    }

    /// Flag a catastrophic failure (loader, planner, serializer)
    pub fn set_error(&self, id: &str) {
        let mut map = self.lock();
        if let Some(entry) = map.get_mut(id) {
            entry.error = true;
            entry.finished_at = Some(Instant::now());
        }
    }

    /// Mark the request finished; the record lingers until swept
    pub fn finish(&self, id: &str) {
        let mut map = self.lock();
        if let Some(entry) = map.get_mut(id) {
            entry.finished_at = Some(Instant::now());
        }
    }

    /// Current counters, or `None` for an unknown id
    pub fn snapshot(&self, id: &str) -> Option<ProgressRecord> {
        let map = self.lock();
        map.get(id).map(|e| ProgressRecord {
            total_batches: e.total_batches,
            completed_batches: e.completed_batches,
            error: e.error,
        })
    }

    /// Whether the request has not advanced for at least `threshold`
    ///
    /// Unknown and finished requests are never stuck.
    pub fn is_stuck(&self, id: &str, threshold: Duration) -> bool {
        let map = self.lock();
        match map.get(id) {
            Some(e) if e.finished_at.is_none() => e.last_advance.elapsed() >= threshold,
            _ => false,
        }
    }

    /// Drop finished records older than `linger`
    pub fn sweep(&self, linger: Duration) {
        let mut map = self.lock();
        map.retain(|_, e| match e.finished_at {
            Some(at) => at.elapsed() < linger,
            None => true,
        });
    }
}
