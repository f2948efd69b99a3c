use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use serde::Serialize;
use tracing::info;
use vcgraph_core::VertexId;
use vcgraph_graph::GraphStore;

use crate::scheduler::{ComputeError, Context, VertexProgram, VertexView};

/// Final answer of a reachability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReachabilityStatus {
    Connected,
    NotConnected,
}

/// Encoding of `Option<ReachabilityStatus>` in the program's status cell.
const UNDECIDED: u8 = 0;
const CONNECTED: u8 = 1;
const NOT_CONNECTED: u8 = 2;

impl ReachabilityStatus {
    fn code(self) -> u8 {
        match self {
            ReachabilityStatus::Connected => CONNECTED,
            ReachabilityStatus::NotConnected => NOT_CONNECTED,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            CONNECTED => Some(ReachabilityStatus::Connected),
            NOT_CONNECTED => Some(ReachabilityStatus::NotConnected),
            _ => None,
        }
    }
}

impl fmt::Display for ReachabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReachabilityStatus::Connected => write!(f, "Connected"),
            ReachabilityStatus::NotConnected => write!(f, "Converged, not Connected"),
        }
    }
}

/// Directed reachability from `source` to `dest` by label propagation.
///
/// Vertex value: the last label the vertex propagated (its own id while
/// unvisited). Edge value: the label written by the edge's source, `None`
/// until something propagates over it. The source floods its id forward one
/// hop per iteration; the run ends as soon as the destination sees the label
/// on an incoming edge, or when an iteration changes nothing.
///
/// A query with `source == dest` is trivially connected.
pub struct ReachabilityProgram {
    source: VertexId,
    dest: VertexId,
    terminate: AtomicBool,
    converged: AtomicBool,
    status: AtomicU8,
}

impl ReachabilityProgram {
    /// Both ids must be vertices of `graph`.
    pub fn new(graph: &GraphStore, source: VertexId, dest: VertexId) -> Result<Self, ComputeError> {
        graph
            .check_vertex(source)
            .map_err(|e| ComputeError::InvalidQuery(format!("source: {}", e)))?;
        graph
            .check_vertex(dest)
            .map_err(|e| ComputeError::InvalidQuery(format!("destination: {}", e)))?;

        Ok(Self {
            source,
            dest,
            terminate: AtomicBool::new(false),
            converged: AtomicBool::new(true),
            status: AtomicU8::new(UNDECIDED),
        })
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn dest(&self) -> VertexId {
        self.dest
    }

    /// Decision of the last run, `None` if the budget ran out first.
    pub fn status(&self) -> Option<ReachabilityStatus> {
        ReachabilityStatus::from_code(self.status.load(Ordering::SeqCst))
    }

    fn decide(&self, status: ReachabilityStatus, ctx: &Context<'_>) {
        let first = self
            .status
            .compare_exchange(UNDECIDED, status.code(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if first {
            info!(
                "{} -> {}: {} (iteration {})",
                self.source,
                self.dest,
                status,
                ctx.iteration()
            );
        }
        ctx.set_last_iteration(ctx.iteration());
    }

    /// Write the source label on every outgoing edge and schedule the targets.
    fn propagate(&self, vertex: &VertexView<'_, VertexId, Option<VertexId>>, ctx: &Context<'_>) {
        let label = Some(self.source);
        for edge in vertex.out_edges() {
            if edge.data() != label {
                edge.set_data(label);
                self.converged.store(false, Ordering::Relaxed);
            }
            ctx.scheduler().add(edge.vertex_id());
        }
    }

    fn sees_source(&self, vertex: &VertexView<'_, VertexId, Option<VertexId>>) -> bool {
        vertex.in_edges().any(|edge| edge.data() == Some(self.source))
    }
}

impl VertexProgram for ReachabilityProgram {
    type VertexData = VertexId;
    type EdgeData = Option<VertexId>;

    fn name(&self) -> &str {
        "reachability"
    }

    fn update(
        &self,
        vertex: &VertexView<'_, VertexId, Option<VertexId>>,
        ctx: &Context<'_>,
    ) -> Result<(), ComputeError> {
        let id = vertex.id();
        let scheduler = ctx.scheduler();

        if ctx.iteration() == 0 {
            vertex.set_data(id);
            for edge in vertex.out_edges() {
                edge.set_data(None);
            }
            scheduler.remove(id, id);
            scheduler.add(self.source);
            self.converged.store(false, Ordering::Relaxed);
            return Ok(());
        }

        if id == self.source {
            if self.source == self.dest {
                self.terminate.store(true, Ordering::Relaxed);
            }
            self.propagate(vertex, ctx);
            scheduler.remove(id, id);
        } else if id == self.dest {
            if self.sees_source(vertex) {
                self.terminate.store(true, Ordering::Relaxed);
            }
        } else if vertex.data() == self.source {
            scheduler.remove(id, id);
        } else {
            // first labelled in-edge is enough
            if self.sees_source(vertex) {
                self.propagate(vertex, ctx);
                vertex.set_data(self.source);
                self.converged.store(false, Ordering::Relaxed);
            }
            scheduler.remove(id, id);
        }
        Ok(())
    }

    fn before_iteration(&self, ctx: &Context<'_>) -> Result<(), ComputeError> {
        if ctx.iteration() == 0 {
            self.status.store(UNDECIDED, Ordering::SeqCst);
        }
        self.terminate.store(false, Ordering::Relaxed);
        self.converged.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn after_iteration(&self, ctx: &Context<'_>) -> Result<(), ComputeError> {
        if self.terminate.load(Ordering::Relaxed) {
            self.decide(ReachabilityStatus::Connected, ctx);
        } else if self.converged.load(Ordering::Relaxed) || ctx.scheduler().is_empty() {
            self.decide(ReachabilityStatus::NotConnected, ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use vcgraph_core::config::EngineConfig;

    use super::*;
    use crate::scheduler::{Engine, StopReason};

    fn config(workers: usize) -> EngineConfig {
        EngineConfig {
            iterations: 1000,
            scheduler: true,
            worker_threads: workers,
            intervals: workers * 2,
        }
    }

    fn graph(edges: &[(VertexId, VertexId)], vertices: usize) -> GraphStore {
        let mut g = GraphStore::with_vertices(vertices);
        for &(a, b) in edges {
            g.add_plain_edge(a, b);
        }
        g
    }

    fn query(g: &GraphStore, src: VertexId, dst: VertexId) -> (Option<ReachabilityStatus>, usize) {
        let mut engine: Engine<'_, ReachabilityProgram> = Engine::new(g, config(2)).unwrap();
        let program = ReachabilityProgram::new(g, src, dst).unwrap();
        let summary = engine.run(&program, 1000).unwrap();
        (program.status(), summary.iterations)
    }

    #[test]
    fn status_lines() {
        assert_eq!(ReachabilityStatus::Connected.to_string(), "Connected");
        assert_eq!(
            ReachabilityStatus::NotConnected.to_string(),
            "Converged, not Connected"
        );
    }

    #[test]
    fn first_decision_sticks_until_reset() {
        let g = graph(&[(1, 2), (2, 3)], 4);
        let mut engine: Engine<'_, ReachabilityProgram> = Engine::new(&g, config(1)).unwrap();
        let program = ReachabilityProgram::new(&g, 1, 3).unwrap();
        assert_eq!(program.status(), None);

        engine.run(&program, 1000).unwrap();
        assert_eq!(program.status(), Some(ReachabilityStatus::Connected));

        // a new run forgets the previous decision
        engine.run(&program, 2).unwrap();
        assert_eq!(program.status(), None);
    }

    #[test]
    fn linear_path_connected() {
        let g = graph(&[(1, 2), (2, 3)], 4);
        let (status, iterations) = query(&g, 1, 3);
        assert_eq!(status, Some(ReachabilityStatus::Connected));
        // iteration 0 resets, then one hop per iteration plus the destination check
        assert_eq!(iterations, 4);
    }

    #[test]
    fn isolated_destination_not_connected() {
        let g = graph(&[(1, 2), (2, 3)], 5);
        let (status, _) = query(&g, 1, 4);
        assert_eq!(status, Some(ReachabilityStatus::NotConnected));
    }

    #[test]
    fn direction_matters() {
        let g = graph(&[(1, 2), (2, 3)], 4);
        let (status, _) = query(&g, 3, 1);
        assert_eq!(status, Some(ReachabilityStatus::NotConnected));
    }

    #[test]
    fn cycles_terminate() {
        // 0 -> 1 -> 2 -> 0, destination 3 unreachable
        let g = graph(&[(0, 1), (1, 2), (2, 0), (3, 0)], 4);
        let (status, _) = query(&g, 0, 3);
        assert_eq!(status, Some(ReachabilityStatus::NotConnected));

        let (status, _) = query(&g, 3, 2);
        assert_eq!(status, Some(ReachabilityStatus::Connected));
    }

    #[test]
    fn source_equals_destination_is_trivially_connected() {
        let g = graph(&[(1, 2)], 3);
        let (status, iterations) = query(&g, 1, 1);
        assert_eq!(status, Some(ReachabilityStatus::Connected));
        assert_eq!(iterations, 2);

        // also when the vertex has no edges at all
        let (status, _) = query(&g, 0, 0);
        assert_eq!(status, Some(ReachabilityStatus::Connected));
    }

    #[test]
    fn source_without_out_edges() {
        let g = graph(&[(1, 0)], 2);
        let (status, iterations) = query(&g, 0, 1);
        assert_eq!(status, Some(ReachabilityStatus::NotConnected));
        assert_eq!(iterations, 2);
    }

    #[test]
    fn diamond_with_shortcut() {
        // 0 -> 1 -> 3, 0 -> 2 -> 3, 3 -> 4
        let g = graph(&[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)], 5);
        let (status, iterations) = query(&g, 0, 4);
        assert_eq!(status, Some(ReachabilityStatus::Connected));
        assert_eq!(iterations, 5);
    }

    #[test]
    fn rejects_unknown_ids() {
        let g = graph(&[(0, 1)], 2);
        assert!(matches!(
            ReachabilityProgram::new(&g, 5, 1),
            Err(ComputeError::InvalidQuery(_))
        ));
        assert!(matches!(
            ReachabilityProgram::new(&g, 0, 2),
            Err(ComputeError::InvalidQuery(_))
        ));
    }

    #[test]
    fn rerun_on_same_engine_is_idempotent() {
        let g = graph(&[(1, 2), (2, 3), (5, 4)], 6);
        let mut engine: Engine<'_, ReachabilityProgram> = Engine::new(&g, config(3)).unwrap();

        let program = ReachabilityProgram::new(&g, 1, 3).unwrap();
        let first = engine.run(&program, 100).unwrap();
        assert_eq!(program.status(), Some(ReachabilityStatus::Connected));

        let second = engine.run(&program, 100).unwrap();
        assert_eq!(program.status(), Some(ReachabilityStatus::Connected));
        assert_eq!(first.iterations, second.iterations);

        // labels from the previous query do not leak into a different one
        let other = ReachabilityProgram::new(&g, 5, 3).unwrap();
        engine.run(&other, 100).unwrap();
        assert_eq!(other.status(), Some(ReachabilityStatus::NotConnected));
    }

    #[test]
    fn labels_left_on_graph() {
        let g = graph(&[(1, 2), (2, 3)], 5);
        let mut engine: Engine<'_, ReachabilityProgram> = Engine::new(&g, config(1)).unwrap();
        let program = ReachabilityProgram::new(&g, 1, 4).unwrap();
        engine.run(&program, 100).unwrap();

        assert_eq!(engine.state().vertex(2), 1);
        assert_eq!(engine.state().vertex(3), 1);
        assert_eq!(engine.state().vertex(0), 0);
        assert_eq!(engine.state().edge(0), Some(1));
        assert_eq!(engine.state().edge(1), Some(1));
    }

    #[test]
    fn budget_exhausted_is_undetermined() {
        let g = graph(&[(0, 1), (1, 2), (2, 3), (3, 4)], 5);
        let mut engine: Engine<'_, ReachabilityProgram> = Engine::new(&g, config(1)).unwrap();
        let program = ReachabilityProgram::new(&g, 0, 4).unwrap();
        let summary = engine.run(&program, 3).unwrap();

        assert_eq!(summary.stop_reason, StopReason::IterationCap);
        assert_eq!(program.status(), None);
    }

    #[test]
    fn works_without_selective_scheduling() {
        let g = graph(&[(1, 2), (2, 3)], 5);
        let mut cfg = config(2);
        cfg.scheduler = false;

        let mut engine: Engine<'_, ReachabilityProgram> = Engine::new(&g, cfg.clone()).unwrap();
        let program = ReachabilityProgram::new(&g, 1, 3).unwrap();
        engine.run(&program, 100).unwrap();
        assert_eq!(program.status(), Some(ReachabilityStatus::Connected));

        let mut engine: Engine<'_, ReachabilityProgram> = Engine::new(&g, cfg).unwrap();
        let program = ReachabilityProgram::new(&g, 1, 4).unwrap();
        let summary = engine.run(&program, 100).unwrap();
        assert_eq!(program.status(), Some(ReachabilityStatus::NotConnected));
        assert_eq!(summary.stop_reason, StopReason::LastIterationSet);
    }
}
