//! Probabilistic k-nearest-neighbors by Monte-Carlo shortest paths.
//!
//! Every edge exists in a sampled realization of the graph with its own
//! probability. Each sampling run is a Dijkstra search over one lazily drawn
//! realization: an edge's Bernoulli trial happens when its tail is settled.
//! Finalized distances are folded into a [`DistanceTable`], whose per-vertex
//! means rank the nearest neighbors of the source.
//!
//! Runs advance one distance level per iteration. All Bernoulli trials are
//! drawn on the driver thread in `after_iteration`, so a seeded generator is
//! advanced in the same order however many workers run the updates:
//! - `after_iteration` settles the next level of every in-flight run, draws
//!   the out-edge trials of each settled vertex (ascending vertex id, then run
//!   id) and schedules it; a new run gets its source trials drawn the same way;
//! - `update` applies the drawn outcomes: it stamps the edges that exist and
//!   offers their targets to the run.

mod ranking;
mod run;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};
use vcgraph_core::VertexId;
use vcgraph_graph::GraphStore;

use crate::scheduler::{ComputeError, Context, VertexProgram, VertexView};

pub use ranking::{DistanceTable, Neighbor, VertexValue};
pub use run::{RunId, SamplingRun};

/// Run caps for a sampling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SamplingSettings {
    /// Total runs started from the source.
    pub runs: usize,
    /// Runs allowed in flight at the same time.
    pub max_in_flight: usize,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            runs: 64,
            max_in_flight: 8,
        }
    }
}

/// Edge value: the most recent traversal of the edge in any run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SampledEdge {
    /// Iteration of the traversal; `None` if the edge never existed in any run.
    pub iteration: Option<usize>,
    /// Path length from the source through this edge in that run.
    pub length: f64,
}

/// Drawn but not yet applied trials of one vertex's out-edges for one run.
struct Expansion {
    run: Arc<Mutex<SamplingRun>>,
    /// Final distance of the vertex in the run (0 for the source).
    distance: f64,
    /// One outcome per out-edge, in out-edge order.
    outcomes: Vec<bool>,
}

#[derive(Default)]
struct RunTable {
    next_id: RunId,
    started: usize,
    completed: usize,
    /// In-flight runs in ascending id order.
    in_flight: Vec<Arc<Mutex<SamplingRun>>>,
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, ComputeError> {
    m.lock()
        .map_err(|e| ComputeError::LockPoisoned(e.to_string()))
}

/// One Bernoulli trial per out-edge of `vertex`, in out-edge order.
fn draw_out_edges<R: Rng>(rng: &mut R, graph: &GraphStore, vertex: VertexId) -> Vec<bool> {
    graph
        .out_edges(vertex)
        .iter()
        .map(|&e| rng.gen_bool(f64::from(graph.edge(e).probability)))
        .collect()
}

/// Vertex program estimating expected shortest-path distances from `source`.
///
/// Generic over the Bernoulli source so tests can inject a seeded generator.
/// The generator is a single instance advanced only on the driver thread, so
/// seeded sessions replay exactly for any worker or interval count.
pub struct SamplingEngine<R = StdRng> {
    source: VertexId,
    settings: SamplingSettings,
    rng: Mutex<R>,
    runs: Mutex<RunTable>,
    pending: Mutex<HashMap<VertexId, Vec<Expansion>>>,
    values: Mutex<DistanceTable>,
}

impl SamplingEngine<StdRng> {
    /// Engine with a generator seeded from OS entropy.
    pub fn new(
        graph: &GraphStore,
        source: VertexId,
        settings: SamplingSettings,
    ) -> Result<Self, ComputeError> {
        Self::with_rng(graph, source, settings, StdRng::from_entropy())
    }

    /// Engine with a reproducible generator.
    pub fn with_seed(
        graph: &GraphStore,
        source: VertexId,
        settings: SamplingSettings,
        seed: u64,
    ) -> Result<Self, ComputeError> {
        Self::with_rng(graph, source, settings, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> SamplingEngine<R> {
    pub fn with_rng(
        graph: &GraphStore,
        source: VertexId,
        settings: SamplingSettings,
        rng: R,
    ) -> Result<Self, ComputeError> {
        graph
            .check_vertex(source)
            .map_err(|e| ComputeError::InvalidQuery(format!("source: {}", e)))?;
        if settings.max_in_flight == 0 {
            return Err(ComputeError::InvalidQuery(
                "max_in_flight must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            source,
            settings,
            rng: Mutex::new(rng),
            runs: Mutex::new(RunTable::default()),
            pending: Mutex::new(HashMap::new()),
            values: Mutex::new(DistanceTable::new()),
        })
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn settings(&self) -> SamplingSettings {
        self.settings
    }

    /// The `k` nearest vertices by mean sampled distance, ties by ascending id.
    pub fn top_k(&self, k: usize) -> Result<Vec<Neighbor>, ComputeError> {
        Ok(lock(&self.values)?.top_k(k))
    }

    /// Aggregate for one vertex, `None` if it was never reached.
    pub fn value(&self, vertex: VertexId) -> Result<Option<VertexValue>, ComputeError> {
        Ok(lock(&self.values)?.get(vertex))
    }

    /// Vertices reached in at least one run.
    pub fn reached(&self) -> Result<usize, ComputeError> {
        Ok(lock(&self.values)?.len())
    }

    pub fn runs_started(&self) -> Result<usize, ComputeError> {
        Ok(lock(&self.runs)?.started)
    }

    pub fn runs_completed(&self) -> Result<usize, ComputeError> {
        Ok(lock(&self.runs)?.completed)
    }

    pub fn runs_in_flight(&self) -> Result<usize, ComputeError> {
        Ok(lock(&self.runs)?.in_flight.len())
    }

    /// Apply the drawn outcomes of `vertex`: stamp each existing edge and
    /// offer its target to the run.
    fn expand(
        &self,
        vertex: &VertexView<'_, (), SampledEdge>,
        ctx: &Context<'_>,
    ) -> Result<(), ComputeError> {
        let Some(jobs) = lock(&self.pending)?.remove(&vertex.id()) else {
            return Ok(());
        };
        for job in jobs {
            let mut run = lock(&job.run)?;
            for (edge, &exists) in vertex.out_edges().zip(&job.outcomes) {
                if !exists {
                    continue;
                }
                let length = job.distance + f64::from(edge.weight());
                edge.set_data(SampledEdge {
                    iteration: Some(ctx.iteration()),
                    length,
                });
                run.offer(edge.vertex_id(), length);
            }
        }
        Ok(())
    }
}

impl<R: Rng + Send> VertexProgram for SamplingEngine<R> {
    type VertexData = ();
    type EdgeData = SampledEdge;

    fn name(&self) -> &str {
        "knn-sampling"
    }

    fn update(
        &self,
        vertex: &VertexView<'_, (), SampledEdge>,
        ctx: &Context<'_>,
    ) -> Result<(), ComputeError> {
        let id = vertex.id();
        ctx.scheduler().remove(id, id);
        if ctx.iteration() == 0 {
            for edge in vertex.out_edges() {
                edge.set_data(SampledEdge::default());
            }
            return Ok(());
        }
        self.expand(vertex, ctx)
    }

    fn before_iteration(&self, ctx: &Context<'_>) -> Result<(), ComputeError> {
        if ctx.iteration() == 0 {
            *lock(&self.runs)? = RunTable::default();
            lock(&self.pending)?.clear();
            lock(&self.values)?.clear();
        }
        Ok(())
    }

    fn after_iteration(&self, ctx: &Context<'_>) -> Result<(), ComputeError> {
        let scheduler = ctx.scheduler();
        let graph = ctx.graph();
        let mut table = lock(&self.runs)?;
        let mut pending = lock(&self.pending)?;
        let mut values = lock(&self.values)?;
        let mut rng = lock(&self.rng)?;

        let mut settled_by_vertex: BTreeMap<VertexId, Vec<(Arc<Mutex<SamplingRun>>, f64)>> =
            BTreeMap::new();
        let mut finished = 0;
        let mut still_running = Vec::with_capacity(table.in_flight.len());
        for handle in table.in_flight.drain(..) {
            let settled = {
                let mut run = lock(&handle)?;
                let settled = run.settle();
                if settled.is_empty() {
                    debug!(
                        "run {} finished in iteration {}: {} vertices reached",
                        run.id(),
                        ctx.iteration(),
                        run.visited_count() - 1
                    );
                }
                settled
            };
            if settled.is_empty() {
                finished += 1;
                continue;
            }
            for (vertex, distance) in settled {
                values.record(vertex, distance);
                settled_by_vertex
                    .entry(vertex)
                    .or_default()
                    .push((Arc::clone(&handle), distance));
            }
            still_running.push(handle);
        }
        table.in_flight = still_running;
        table.completed += finished;

        // ascending vertex id, then ascending run id
        for (vertex, runs) in settled_by_vertex {
            let jobs = pending.entry(vertex).or_default();
            for (run, distance) in runs {
                let outcomes = draw_out_edges(&mut *rng, graph, vertex);
                jobs.push(Expansion {
                    run,
                    distance,
                    outcomes,
                });
            }
            scheduler.add(vertex);
        }

        if table.started < self.settings.runs && table.in_flight.len() < self.settings.max_in_flight
        {
            let id = table.next_id;
            table.next_id += 1;
            table.started += 1;

            let run = Arc::new(Mutex::new(SamplingRun::new(id, self.source)));
            let outcomes = draw_out_edges(&mut *rng, graph, self.source);
            debug!(
                "run {} starts in iteration {}: {} of {} source edges exist",
                id,
                ctx.iteration() + 1,
                outcomes.iter().filter(|&&e| e).count(),
                outcomes.len()
            );
            pending.entry(self.source).or_default().push(Expansion {
                run: Arc::clone(&run),
                distance: 0.0,
                outcomes,
            });
            table.in_flight.push(run);
            scheduler.add(self.source);
        } else if table.started >= self.settings.runs && table.in_flight.is_empty() {
            info!(
                "{} sampling runs from {} complete after iteration {}: {} vertices reached",
                table.completed,
                self.source,
                ctx.iteration(),
                values.len()
            );
            ctx.set_last_iteration(ctx.iteration());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
