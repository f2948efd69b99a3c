use std::collections::HashMap;

use serde::Serialize;
use vcgraph_core::VertexId;

/// Aggregate of one target vertex's finalized distances across runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VertexValue {
    pub sum: f64,
    pub count: u64,
}

impl VertexValue {
    pub fn record(&mut self, distance: f64) {
        self.sum += distance;
        self.count += 1;
    }

    /// Mean finalized distance; `None` until the vertex was reached once.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// One entry of a top-k answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub vertex: VertexId,
    pub mean_distance: f64,
    /// Runs in which the vertex was reached.
    pub samples: u64,
}

/// Per-vertex distance aggregates, created lazily on first finalization.
#[derive(Debug, Default)]
pub struct DistanceTable {
    values: HashMap<VertexId, VertexValue>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, vertex: VertexId, distance: f64) {
        self.values.entry(vertex).or_default().record(distance);
    }

    pub fn get(&self, vertex: VertexId) -> Option<VertexValue> {
        self.values.get(&vertex).copied()
    }

    /// Vertices reached at least once.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// The `k` vertices with the smallest mean distance, ties by ascending id.
    /// Vertices never reached are not ranked.
    pub fn top_k(&self, k: usize) -> Vec<Neighbor> {
        let mut ranked: Vec<Neighbor> = self
            .values
            .iter()
            .filter_map(|(&vertex, value)| {
                value.mean().map(|mean_distance| Neighbor {
                    vertex,
                    mean_distance,
                    samples: value.count,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.mean_distance
                .total_cmp(&b.mean_distance)
                .then_with(|| a.vertex.cmp(&b.vertex))
        });
        ranked.truncate(k);
        ranked
    }
}
