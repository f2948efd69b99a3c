use std::sync::Mutex;

use vcgraph_core::{EdgeId, VertexId};
use vcgraph_graph::{EdgeRecord, GraphStore};

use super::state::{lock, ComputeState};

/// A vertex as seen by a program's `update`: its id, its value and the values
/// of its incident edges.
pub struct VertexView<'a, V, E> {
    id: VertexId,
    graph: &'a GraphStore,
    state: &'a ComputeState<V, E>,
}

impl<'a, V: Copy + Default, E: Copy + Default> VertexView<'a, V, E> {
    pub fn new(id: VertexId, graph: &'a GraphStore, state: &'a ComputeState<V, E>) -> Self {
        Self { id, graph, state }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn data(&self) -> V {
        self.state.vertex(self.id)
    }

    pub fn set_data(&self, value: V) {
        self.state.set_vertex(self.id, value);
    }

    pub fn num_in_edges(&self) -> usize {
        self.graph.in_edges(self.id).len()
    }

    pub fn num_out_edges(&self) -> usize {
        self.graph.out_edges(self.id).len()
    }

    /// `i`-th incoming edge; its `vertex_id()` is the edge's source.
    ///
    /// Panics if `i >= num_in_edges()`.
    pub fn in_edge(&self, i: usize) -> EdgeView<'a, E> {
        let id = self.graph.in_edges(self.id)[i];
        self.edge_view(id, true)
    }

    /// `i`-th outgoing edge; its `vertex_id()` is the edge's target.
    ///
    /// Panics if `i >= num_out_edges()`.
    pub fn out_edge(&self, i: usize) -> EdgeView<'a, E> {
        let id = self.graph.out_edges(self.id)[i];
        self.edge_view(id, false)
    }

    pub fn in_edges(&self) -> impl Iterator<Item = EdgeView<'a, E>> + '_ {
        self.graph
            .in_edges(self.id)
            .iter()
            .map(move |&id| self.edge_view(id, true))
    }

    pub fn out_edges(&self) -> impl Iterator<Item = EdgeView<'a, E>> + '_ {
        self.graph
            .out_edges(self.id)
            .iter()
            .map(move |&id| self.edge_view(id, false))
    }

    fn edge_view(&self, id: EdgeId, incoming: bool) -> EdgeView<'a, E> {
        let record = self.graph.edge(id);
        let neighbor = if incoming { record.source } else { record.target };
        EdgeView {
            id,
            neighbor,
            record,
            slot: self.state.edge_slot(id),
        }
    }
}

/// One incident edge of a [`VertexView`].
pub struct EdgeView<'a, E> {
    id: EdgeId,
    neighbor: VertexId,
    record: &'a EdgeRecord,
    slot: &'a Mutex<E>,
}

impl<E: Copy> EdgeView<'_, E> {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// The endpoint on the other side of the viewing vertex.
    pub fn vertex_id(&self) -> VertexId {
        self.neighbor
    }

    pub fn data(&self) -> E {
        *lock(self.slot)
    }

    pub fn set_data(&self, value: E) {
        *lock(self.slot) = value;
    }

    pub fn record(&self) -> &EdgeRecord {
        self.record
    }

    pub fn probability(&self) -> f32 {
        self.record.probability
    }

    pub fn weight(&self) -> f32 {
        self.record.weight
    }
}
