use serde::Serialize;
use vcgraph_core::{EdgeId, Interval, VertexId};

use crate::error::GraphError;

/// Existence probability used when an edge list omits the column.
pub const DEFAULT_PROBABILITY: f32 = 1.0;

/// Edge weight used when an edge list omits the column.
pub const DEFAULT_WEIGHT: f32 = 1.0;

/// Vertex count above which `add_edge` rejects ids.
pub const DEFAULT_MAX_VERTICES: usize = 1 << 26;

/// Immutable part of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeRecord {
    pub source: VertexId,
    pub target: VertexId,
    /// Probability that the edge exists in one sampled realization.
    pub probability: f32,
    /// Cost of traversing the edge when it exists.
    pub weight: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub isolated_count: usize,
    pub max_out_degree: usize,
    pub max_in_degree: usize,
}

/// Directed graph over dense vertex ids with per-vertex in/out edge lists.
///
/// Edge ids index `edges`; `outgoing[v]` and `incoming[v]` hold the ids of the
/// edges leaving and entering `v` in insertion order.
#[derive(Debug)]
pub struct GraphStore {
    edges: Vec<EdgeRecord>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    max_vertices: usize,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self {
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            max_vertices: DEFAULT_MAX_VERTICES,
        }
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph with `n` isolated vertices `0..n`.
    pub fn with_vertices(n: usize) -> Self {
        Self {
            outgoing: vec![Vec::new(); n],
            incoming: vec![Vec::new(); n],
            ..Self::default()
        }
    }

    /// Cap the id space: `add_edge` rejects ids `>= max_vertices`.
    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = max_vertices;
        self
    }

    pub fn max_vertices(&self) -> usize {
        self.max_vertices
    }

    /// Grow the id space so that `0..n` are all valid vertices.
    pub fn ensure_vertices(&mut self, n: usize) {
        if n > self.outgoing.len() {
            self.outgoing.resize_with(n, Vec::new);
            self.incoming.resize_with(n, Vec::new);
        }
    }

    /// Add a directed edge, validating its sampling parameters.
    ///
    /// Probabilities outside `[0, 1]` (or NaN) and non-positive or non-finite
    /// weights are rejected, never clamped. So are ids beyond `max_vertices`,
    /// before anything is allocated for them.
    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        probability: f32,
        weight: f32,
    ) -> Result<EdgeId, GraphError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(GraphError::InvalidProbability {
                source_id: source,
                target,
                probability,
            });
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(GraphError::InvalidWeight {
                source_id: source,
                target,
                weight,
            });
        }
        let largest = source.max(target);
        if largest as usize >= self.max_vertices {
            return Err(GraphError::VertexLimit {
                id: largest,
                max_vertices: self.max_vertices,
            });
        }

        let needed = source.max(target) as usize + 1;
        self.ensure_vertices(needed);

        let id = self.edges.len();
        self.edges.push(EdgeRecord {
            source,
            target,
            probability,
            weight,
        });
        self.outgoing[source as usize].push(id);
        self.incoming[target as usize].push(id);
        Ok(id)
    }

    /// Add an edge with default probability and weight. Ids are trusted; use
    /// `add_edge` for untrusted input.
    pub fn add_plain_edge(&mut self, source: VertexId, target: VertexId) -> EdgeId {
        let needed = source.max(target) as usize + 1;
        self.ensure_vertices(needed);
        let id = self.edges.len();
        self.edges.push(EdgeRecord {
            source,
            target,
            probability: DEFAULT_PROBABILITY,
            weight: DEFAULT_WEIGHT,
        });
        self.outgoing[source as usize].push(id);
        self.incoming[target as usize].push(id);
        id
    }

    pub fn num_vertices(&self) -> usize {
        self.outgoing.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: VertexId) -> bool {
        (id as usize) < self.num_vertices()
    }

    /// Fail with `UnknownVertex` unless `id` is a vertex of this graph.
    pub fn check_vertex(&self, id: VertexId) -> Result<(), GraphError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownVertex {
                id,
                num_vertices: self.num_vertices(),
            })
        }
    }

    pub fn edge(&self, id: EdgeId) -> &EdgeRecord {
        &self.edges[id]
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    /// Ids of the edges leaving `v`. Empty for unknown vertices.
    pub fn out_edges(&self, v: VertexId) -> &[EdgeId] {
        self.outgoing.get(v as usize).map(|e| e.as_slice()).unwrap_or(&[])
    }

    /// Ids of the edges entering `v`. Empty for unknown vertices.
    pub fn in_edges(&self, v: VertexId) -> &[EdgeId] {
        self.incoming.get(v as usize).map(|e| e.as_slice()).unwrap_or(&[])
    }

    /// Split the id space into at most `count` contiguous, non-overlapping
    /// windows covering every vertex. Earlier windows get the remainder.
    pub fn intervals(&self, count: usize) -> Vec<Interval> {
        let n = self.num_vertices();
        if n == 0 {
            return Vec::new();
        }
        let count = count.clamp(1, n);
        let base = n / count;
        let extra = n % count;

        let mut windows = Vec::with_capacity(count);
        let mut lo = 0usize;
        for i in 0..count {
            let width = base + usize::from(i < extra);
            let hi = lo + width - 1;
            windows.push(Interval::new(lo as VertexId, hi as VertexId));
            lo = hi + 1;
        }
        windows
    }

    pub fn stats(&self) -> GraphStats {
        let isolated_count = (0..self.num_vertices())
            .filter(|&v| self.outgoing[v].is_empty() && self.incoming[v].is_empty())
            .count();

        GraphStats {
            vertex_count: self.num_vertices(),
            edge_count: self.num_edges(),
            isolated_count,
            max_out_degree: self.outgoing.iter().map(Vec::len).max().unwrap_or(0),
            max_in_degree: self.incoming.iter().map(Vec::len).max().unwrap_or(0),
        }
    }
}
