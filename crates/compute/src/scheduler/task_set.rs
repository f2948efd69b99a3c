use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use vcgraph_core::VertexId;

/// Set of vertex ids scheduled for the next iteration.
///
/// One flag per vertex, so membership, `add` and `remove` are race-free from
/// any number of concurrently running updates. With selective scheduling
/// disabled every vertex is permanently active and `add`/`remove` are no-ops.
#[derive(Debug)]
pub struct TaskScheduler {
    active: Vec<AtomicBool>,
    selective: bool,
}

impl TaskScheduler {
    /// New scheduler over `0..num_vertices`, every vertex active.
    pub fn new(num_vertices: usize, selective: bool) -> Self {
        Self {
            active: (0..num_vertices).map(|_| AtomicBool::new(true)).collect(),
            selective,
        }
    }

    /// Reactivate every vertex (the state before iteration 0).
    pub fn reset(&self) {
        for flag in &self.active {
            flag.store(true, Ordering::Relaxed);
        }
    }

    pub fn is_selective(&self) -> bool {
        self.selective
    }

    /// Mark `id` active for the next iteration. Idempotent.
    pub fn add(&self, id: VertexId) {
        if !self.selective {
            return;
        }
        match self.active.get(id as usize) {
            Some(flag) => flag.store(true, Ordering::Relaxed),
            None => debug!("ignoring add for unknown vertex {}", id),
        }
    }

    /// Deactivate every id in `[lo, hi]`. Ids past the end are ignored.
    pub fn remove(&self, lo: VertexId, hi: VertexId) {
        if !self.selective || lo > hi {
            return;
        }
        let end = (hi as usize + 1).min(self.active.len());
        for flag in self.active.iter().take(end).skip(lo as usize) {
            flag.store(false, Ordering::Relaxed);
        }
    }

    pub fn is_active(&self, id: VertexId) -> bool {
        if !self.selective {
            return (id as usize) < self.active.len();
        }
        self.active
            .get(id as usize)
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn active_count(&self) -> usize {
        if !self.selective {
            return self.active.len();
        }
        self.active
            .iter()
            .filter(|flag| flag.load(Ordering::Relaxed))
            .count()
    }

    /// True when nothing is scheduled. Never true without selective scheduling.
    pub fn is_empty(&self) -> bool {
        if !self.selective {
            return false;
        }
        !self.active.iter().any(|flag| flag.load(Ordering::Relaxed))
    }

    /// Freeze the current active set as the frontier of one iteration.
    pub fn snapshot(&self) -> Frontier {
        let active: Vec<bool> = (0..self.active.len())
            .map(|id| self.is_active(id as VertexId))
            .collect();
        let count = active.iter().filter(|&&a| a).count();
        Frontier { active, count }
    }
}

/// Vertices updated during one iteration, fixed when the iteration starts.
#[derive(Debug, Clone)]
pub struct Frontier {
    active: Vec<bool>,
    count: usize,
}

impl Frontier {
    pub fn contains(&self, id: VertexId) -> bool {
        self.active.get(id as usize).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
