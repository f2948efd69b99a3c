use std::sync::{Mutex, MutexGuard};

use vcgraph_core::{EdgeId, VertexId};
use vcgraph_graph::GraphStore;

/// Mutable algorithm values for every vertex and edge of a graph.
///
/// Each slot has its own lock: two endpoints of an edge may be updated in
/// different intervals at the same time, and a reader must never observe a
/// half-written value. Values are `Copy`, so a lock is only held for the
/// duration of one load or store.
#[derive(Debug)]
pub struct ComputeState<V, E> {
    vertices: Vec<Mutex<V>>,
    edges: Vec<Mutex<E>>,
}

impl<V: Copy + Default, E: Copy + Default> ComputeState<V, E> {
    /// Default-initialised slots sized to `graph`.
    pub fn for_graph(graph: &GraphStore) -> Self {
        Self {
            vertices: (0..graph.num_vertices()).map(|_| Mutex::new(V::default())).collect(),
            edges: (0..graph.num_edges()).map(|_| Mutex::new(E::default())).collect(),
        }
    }

    pub fn vertex(&self, id: VertexId) -> V {
        *lock(&self.vertices[id as usize])
    }

    pub fn set_vertex(&self, id: VertexId, value: V) {
        *lock(&self.vertices[id as usize]) = value;
    }

    pub fn edge(&self, id: EdgeId) -> E {
        *lock(&self.edges[id])
    }

    pub fn set_edge(&self, id: EdgeId, value: E) {
        *lock(&self.edges[id]) = value;
    }

    pub(crate) fn edge_slot(&self, id: EdgeId) -> &Mutex<E> {
        &self.edges[id]
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}

/// A slot only holds plain `Copy` data, so a panic elsewhere cannot leave it
/// half-updated; recover the value instead of propagating the poison.
pub(crate) fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_sized_to_graph() {
        let mut g = GraphStore::new();
        g.add_plain_edge(0, 1);
        g.add_plain_edge(1, 2);
        let state: ComputeState<u32, Option<u32>> = ComputeState::for_graph(&g);
        assert_eq!(state.num_vertices(), 3);
        assert_eq!(state.num_edges(), 2);
        assert_eq!(state.vertex(2), 0);
        assert_eq!(state.edge(1), None);
    }

    #[test]
    fn set_and_get() {
        let g = GraphStore::with_vertices(2);
        let state: ComputeState<u32, ()> = ComputeState::for_graph(&g);
        state.set_vertex(1, 7);
        assert_eq!(state.vertex(1), 7);
        assert_eq!(state.vertex(0), 0);
    }
}
