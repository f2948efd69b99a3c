use std::sync::atomic::{AtomicUsize, Ordering};

use vcgraph_core::{Interval, VertexId};
use vcgraph_graph::{GraphError, GraphStore};

use super::task_set::TaskScheduler;
use super::vertex::VertexView;

/// Error type for engine runs and vertex programs.
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Update of vertex {vertex} failed in iteration {iteration}: {reason}")]
    UpdateFailed {
        vertex: VertexId,
        iteration: usize,
        reason: String,
    },
    #[error("Program failed: {0}")]
    Failed(String),
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
    #[error("Thread pool: {0}")]
    ThreadPool(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Per-iteration view of the engine handed to every program callback.
pub struct Context<'a> {
    iteration: usize,
    num_iterations: usize,
    scheduler: &'a TaskScheduler,
    graph: &'a GraphStore,
    last_iteration: &'a AtomicUsize,
}

/// Sentinel meaning "no early stop requested".
pub(crate) const NO_LAST_ITERATION: usize = usize::MAX;

impl<'a> Context<'a> {
    pub(crate) fn new(
        iteration: usize,
        num_iterations: usize,
        scheduler: &'a TaskScheduler,
        graph: &'a GraphStore,
        last_iteration: &'a AtomicUsize,
    ) -> Self {
        Self {
            iteration,
            num_iterations,
            scheduler,
            graph,
            last_iteration,
        }
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Iteration budget of the current run.
    pub fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        self.scheduler
    }

    pub fn graph(&self) -> &GraphStore {
        self.graph
    }

    pub fn num_vertices(&self) -> usize {
        self.graph.num_vertices()
    }

    /// End the run once iteration `iteration` completes. Takes effect at the
    /// next iteration boundary; the earliest request wins.
    pub fn set_last_iteration(&self, iteration: usize) {
        self.last_iteration.fetch_min(iteration, Ordering::SeqCst);
    }

    pub fn last_iteration(&self) -> Option<usize> {
        match self.last_iteration.load(Ordering::SeqCst) {
            NO_LAST_ITERATION => None,
            n => Some(n),
        }
    }
}

/// A vertex-centric algorithm run by the [`Engine`](super::Engine).
///
/// `update` is called once per active vertex per iteration, concurrently for
/// vertices in different intervals, so implementations keep their shared
/// state behind atomics or locks. Lifecycle hooks run on the driver thread,
/// except the interval hooks, which run on the worker owning the interval.
pub trait VertexProgram: Send + Sync {
    type VertexData: Copy + Default + Send + Sync;
    type EdgeData: Copy + Default + Send + Sync;

    /// Human-readable name for logging and summaries.
    fn name(&self) -> &str;

    fn update(
        &self,
        vertex: &VertexView<'_, Self::VertexData, Self::EdgeData>,
        ctx: &Context<'_>,
    ) -> Result<(), ComputeError>;

    fn before_iteration(&self, _ctx: &Context<'_>) -> Result<(), ComputeError> {
        Ok(())
    }

    fn after_iteration(&self, _ctx: &Context<'_>) -> Result<(), ComputeError> {
        Ok(())
    }

    fn before_interval(&self, _interval: Interval, _ctx: &Context<'_>) {}

    fn after_interval(&self, _interval: Interval, _ctx: &Context<'_>) {}
}
