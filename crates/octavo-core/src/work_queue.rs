//! Lock-free work queue distributing record ranges across pool workers

use std::sync::atomic::{AtomicUsize, Ordering};

/// Lock-free queue of work items claimed by pool workers.
///
/// Workers call [`claim()`](WorkQueue::claim) to atomically take the next
/// item together with its index. Items are handed out in insertion order,
/// which the orchestrator relies on for contiguous range dispatch.
pub struct WorkQueue<S> {
    items: Vec<S>,
    cursor: AtomicUsize,
}

impl<S> WorkQueue<S> {
    pub fn new(items: Vec<S>) -> Self {
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claim the next item and its position, or `None` when drained.
    pub fn claim(&self) -> Option<(usize, &S)> {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.items.get(i).map(|item| (i, item))
    }

    /// Total items in the queue
    pub fn total(&self) -> usize {
        self.items.len()
    }
}
