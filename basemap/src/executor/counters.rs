//! Shared completion counters for one fetch round.
//!
//! Each planning round allocates a fresh [`FetchCounters`] sized to its
//! plan at the moment jobs are submitted. Workers increment `completed`
//! as jobs finish; the controller thread polls a snapshot on every redraw
//! and never blocks. Jobs from a superseded round keep incrementing their
//! own (discarded) counters, so a live round can never observe
//! `completed > total`.

use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    total: usize,
    completed: usize,
}

/// Mutex-guarded `(total, completed)` pair for one fetch round.
#[derive(Debug, Default)]
pub struct FetchCounters {
    inner: Mutex<Counts>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub total: usize,
    pub completed: usize,
}

impl CountersSnapshot {
    /// A round is complete once every submitted job has finished.
    ///
    /// An empty round (`total == 0`) never reports complete; the
    /// controller treats it as having nothing to wait for.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

impl FetchCounters {
    /// Allocate counters for a round of `total` jobs, starting at zero
    /// completed. `total` and `completed` are always reset together.
    pub fn new_round(total: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Counts {
                total,
                completed: 0,
            }),
        })
    }

    /// Record one finished job, whatever its outcome.
    pub fn mark_completed(&self) {
        let mut counts = self.inner.lock();
        debug_assert!(counts.completed < counts.total, "more completions than jobs");
        counts.completed = counts.completed.saturating_add(1).min(counts.total);
    }

    /// Consistent point-in-time read of both counters.
    pub fn snapshot(&self) -> CountersSnapshot {
        let counts = self.inner.lock();
        CountersSnapshot {
            total: counts.total,
            completed: counts.completed,
        }
    }
}
