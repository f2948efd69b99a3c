use serde::Serialize;
use tracing::{info, warn};
use vcgraph_core::config::{EngineConfig, RunConfig};
use vcgraph_core::VertexId;
use vcgraph_graph::GraphStore;

use crate::algorithms::reachability::{ReachabilityProgram, ReachabilityStatus};
use crate::algorithms::sampling::{Neighbor, SamplingEngine, SamplingSettings};
use crate::scheduler::{ComputeError, Engine, RunSummary};

/// Algorithm variant chosen at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum Algorithm {
    Reachability {
        source: VertexId,
        dest: VertexId,
    },
    Knn {
        source: VertexId,
        k: usize,
        settings: SamplingSettings,
        seed: Option<u64>,
    },
}

impl Algorithm {
    /// Reachability query from the `[reachability]` section.
    pub fn reachability(config: &RunConfig) -> Result<Self, ComputeError> {
        let source = config
            .reachability
            .source
            .ok_or_else(|| ComputeError::InvalidQuery("reachability source is not set".into()))?;
        let dest = config
            .reachability
            .dest
            .ok_or_else(|| ComputeError::InvalidQuery("reachability destination is not set".into()))?;
        Ok(Self::Reachability { source, dest })
    }

    /// Nearest-neighbor sampling from the `[sampling]` section.
    pub fn knn(config: &RunConfig) -> Result<Self, ComputeError> {
        let sampling = &config.sampling;
        let source = sampling
            .source
            .ok_or_else(|| ComputeError::InvalidQuery("sampling source is not set".into()))?;
        Ok(Self::Knn {
            source,
            k: sampling.k,
            settings: SamplingSettings {
                runs: sampling.runs,
                max_in_flight: sampling.max_in_flight,
            },
            seed: sampling.seed,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Reachability { .. } => "reachability",
            Algorithm::Knn { .. } => "knn",
        }
    }

    /// Validate the query against `graph`, run it to completion (or to the
    /// iteration budget in `config`) and collect the answer.
    pub fn run(
        &self,
        graph: &GraphStore,
        config: &EngineConfig,
    ) -> Result<AlgorithmReport, ComputeError> {
        let start = std::time::Instant::now();
        info!("Running {}...", self.name());

        let report = match *self {
            Algorithm::Reachability { source, dest } => {
                let program = ReachabilityProgram::new(graph, source, dest)?;
                let mut engine: Engine<'_, ReachabilityProgram> =
                    Engine::new(graph, config.clone())?;
                let summary = engine.run(&program, config.iterations)?;
                let status = program.status();
                if status.is_none() {
                    warn!(
                        "{} -> {} undetermined after {} iterations",
                        source, dest, summary.iterations
                    );
                }
                AlgorithmReport::Reachability {
                    source,
                    dest,
                    status,
                    summary,
                }
            }
            Algorithm::Knn {
                source,
                k,
                settings,
                seed,
            } => {
                let program = match seed {
                    Some(seed) => SamplingEngine::with_seed(graph, source, settings, seed)?,
                    None => SamplingEngine::new(graph, source, settings)?,
                };
                let mut engine: Engine<'_, SamplingEngine> = Engine::new(graph, config.clone())?;
                let summary = engine.run(&program, config.iterations)?;
                let runs_completed = program.runs_completed()?;
                if runs_completed < settings.runs {
                    warn!(
                        "Only {} of {} sampling runs completed within {} iterations",
                        runs_completed, settings.runs, summary.iterations
                    );
                }
                AlgorithmReport::Knn {
                    source,
                    k,
                    runs_completed,
                    neighbors: program.top_k(k)?,
                    summary,
                }
            }
        };

        info!(
            "{} complete in {:.3}s",
            self.name(),
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }
}

/// Answer of one algorithm run plus the engine's run summary.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum AlgorithmReport {
    Reachability {
        source: VertexId,
        dest: VertexId,
        /// `None` when the iteration budget ran out before a decision.
        status: Option<ReachabilityStatus>,
        summary: RunSummary,
    },
    Knn {
        source: VertexId,
        k: usize,
        runs_completed: usize,
        neighbors: Vec<Neighbor>,
        summary: RunSummary,
    },
}

impl AlgorithmReport {
    pub fn summary(&self) -> &RunSummary {
        match self {
            AlgorithmReport::Reachability { summary, .. } | AlgorithmReport::Knn { summary, .. } => {
                summary
            }
        }
    }

    /// False when the run stopped before reaching an answer.
    pub fn is_determined(&self) -> bool {
        match self {
            AlgorithmReport::Reachability { status, .. } => status.is_some(),
            AlgorithmReport::Knn { .. } => true,
        }
    }

    /// The observable output: one status line, or one `vertex<TAB>mean` line
    /// per neighbor.
    pub fn lines(&self) -> Vec<String> {
        match self {
            AlgorithmReport::Reachability { status, .. } => status
                .map(|s| vec![s.to_string()])
                .unwrap_or_default(),
            AlgorithmReport::Knn { neighbors, .. } => neighbors
                .iter()
                .map(|n| format!("{}\t{}", n.vertex, n.mean_distance))
                .collect(),
        }
    }
}
