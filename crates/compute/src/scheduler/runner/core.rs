use tracing::info;
use vcgraph_core::config::EngineConfig;
use vcgraph_core::Interval;
use vcgraph_graph::GraphStore;

use crate::scheduler::metrics::EngineMetrics;
use crate::scheduler::state::ComputeState;
use crate::scheduler::task::{ComputeError, VertexProgram};
use crate::scheduler::task_set::TaskScheduler;

/// The iteration driver. Owns the vertex/edge values of one program type over
/// a borrowed graph, the task scheduler, and a worker pool for intervals.
///
/// Values persist across [`run`](Engine::run) calls, like data files that a
/// disk-based engine rewrites in place; programs reset them in iteration 0.
pub struct Engine<'g, P: VertexProgram> {
    pub(super) graph: &'g GraphStore,
    pub(super) config: EngineConfig,
    pub(super) state: ComputeState<P::VertexData, P::EdgeData>,
    pub(super) scheduler: TaskScheduler,
    pub(super) intervals: Vec<Interval>,
    pub(super) pool: rayon::ThreadPool,
    pub(super) metrics: EngineMetrics,
}

impl<'g, P: VertexProgram> Engine<'g, P> {
    /// Create an engine with default-initialised values for every vertex and edge.
    pub fn new(graph: &'g GraphStore, config: EngineConfig) -> Result<Self, ComputeError> {
        let num_workers = config.resolved_worker_threads();
        let intervals = graph.intervals(config.resolved_intervals());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .thread_name(|i| format!("vcgraph-worker-{}", i))
            .build()
            .map_err(|e| ComputeError::ThreadPool(e.to_string()))?;

        info!(
            "Engine ready: {} vertices, {} edges, {} intervals, {} workers, scheduler {}",
            graph.num_vertices(),
            graph.num_edges(),
            intervals.len(),
            num_workers,
            if config.scheduler { "on" } else { "off" }
        );

        Ok(Self {
            graph,
            state: ComputeState::for_graph(graph),
            scheduler: TaskScheduler::new(graph.num_vertices(), config.scheduler),
            intervals,
            pool,
            config,
            metrics: EngineMetrics::default(),
        })
    }

    pub fn graph(&self) -> &GraphStore {
        self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    /// Current vertex and edge values.
    pub fn state(&self) -> &ComputeState<P::VertexData, P::EdgeData> {
        &self.state
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }
}
