use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use vcgraph_core::VertexId;

/// Sequence number of a sampling run.
pub type RunId = u64;

/// A priority queue entry for one run's Dijkstra search.
///
/// Uses reversed ordering so `BinaryHeap` (a max-heap) behaves as a min-heap.
/// Equal distances pop in ascending vertex order.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    vertex: VertexId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// State of one randomized single-source shortest-path search.
///
/// Owned by exactly one run; the visited map only grows, and a vertex's
/// distance is final once it is in it.
#[derive(Debug)]
pub struct SamplingRun {
    id: RunId,
    source: VertexId,
    queue: BinaryHeap<Candidate>,
    visited: HashMap<VertexId, f64>,
}

impl SamplingRun {
    /// Fresh run. The source is settled at distance 0.
    pub fn new(id: RunId, source: VertexId) -> Self {
        let mut visited = HashMap::new();
        visited.insert(source, 0.0);
        Self {
            id,
            source,
            queue: BinaryHeap::new(),
            visited,
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    /// Queue `vertex` at a tentative `distance`. Ignored (returns false) if the
    /// vertex is already settled.
    pub fn offer(&mut self, vertex: VertexId, distance: f64) -> bool {
        if self.visited.contains_key(&vertex) {
            return false;
        }
        self.queue.push(Candidate { distance, vertex });
        true
    }

    /// Pop every entry at the current minimum distance and settle the vertices
    /// not yet visited, returning them with their final distance.
    ///
    /// Stale entries are discarded; if a whole level turns out stale the next
    /// level is tried, so an empty result means the queue is exhausted.
    pub fn settle(&mut self) -> Vec<(VertexId, f64)> {
        let mut settled = Vec::new();
        while settled.is_empty() {
            let Some(level) = self.queue.peek().map(|c| c.distance) else {
                break;
            };
            while let Some(top) = self.queue.peek() {
                if top.distance > level {
                    break;
                }
                let Candidate { distance, vertex } = *top;
                self.queue.pop();
                if self.visited.contains_key(&vertex) {
                    continue;
                }
                self.visited.insert(vertex, distance);
                settled.push((vertex, distance));
            }
        }
        settled
    }

    /// Nothing left to settle.
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_visited(&self, vertex: VertexId) -> bool {
        self.visited.contains_key(&vertex)
    }

    /// Final distance of `vertex` in this run, if settled.
    pub fn distance(&self, vertex: VertexId) -> Option<f64> {
        self.visited.get(&vertex).copied()
    }

    /// Settled vertices, source included.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}
