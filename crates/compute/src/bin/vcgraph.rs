//! vcgraph: run a vertex-centric query over an edge-list graph.
//!
//! Settings come from an optional TOML file, then `VCGRAPH_*` environment
//! variables (a `.env` file is honored), then command-line flags.
//!
//! Output:
//! - `reachability`: exactly one line, `Connected` or `Converged, not Connected`
//! - `knn`: one `vertex<TAB>mean distance` line per neighbor, nearest first
//!
//! With `--json` the answer, run summary and effective settings are printed as
//! one JSON document instead.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use vcgraph_compute::{Algorithm, AlgorithmReport};
use vcgraph_core::config::{load_dotenv, RunConfig};
use vcgraph_core::VertexId;
use vcgraph_graph::load_edge_list_with_limit;

// ── CLI ─────────────────────────────────────────────────────────────

/// Dynamic reachability and sampled nearest neighbors on directed graphs.
#[derive(Parser, Debug)]
#[command(name = "vcgraph", version, about)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, env = "VCGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Edge-list file (`source target [probability [weight]]` per line).
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Reserve at least this many vertices.
    #[arg(long)]
    vertices: Option<u32>,

    /// Reject edge lists with vertex ids at or above this bound.
    #[arg(long)]
    max_vertices: Option<usize>,

    /// Iteration budget.
    #[arg(long)]
    niters: Option<usize>,

    /// Run every vertex in every iteration instead of only scheduled ones.
    #[arg(long)]
    no_scheduler: bool,

    /// Worker threads (0 = available parallelism).
    #[arg(long)]
    threads: Option<usize>,

    /// Id intervals per iteration (0 = four per worker).
    #[arg(long)]
    intervals: Option<usize>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Is there a directed path from the source to the destination?
    Reachability {
        #[arg(long)]
        source: Option<VertexId>,
        #[arg(long)]
        dest: Option<VertexId>,
    },
    /// The k vertices with the smallest expected distance from the source.
    Knn {
        #[arg(long)]
        source: Option<VertexId>,
        #[arg(long)]
        k: Option<usize>,
        /// Total sampling runs.
        #[arg(long)]
        runs: Option<usize>,
        /// Runs allowed in flight at once.
        #[arg(long)]
        max_in_flight: Option<usize>,
        /// Seed for reproducible sampling.
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Cli {
    /// Resolve file, environment and flag settings into one config.
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => RunConfig::default(),
        };
        config
            .apply_env()
            .context("invalid VCGRAPH_* environment override")?;

        if let Some(path) = &self.graph {
            config.graph.path = Some(path.clone());
        }
        if let Some(n) = self.vertices {
            config.graph.vertices = Some(n);
        }
        if let Some(n) = self.max_vertices {
            config.graph.max_vertices = n;
        }
        if let Some(n) = self.niters {
            config.engine.iterations = n;
        }
        if self.no_scheduler {
            config.engine.scheduler = false;
        }
        if let Some(n) = self.threads {
            config.engine.worker_threads = n;
        }
        if let Some(n) = self.intervals {
            config.engine.intervals = n;
        }

        match self.command {
            Command::Reachability { source, dest } => {
                if source.is_some() {
                    config.reachability.source = source;
                }
                if dest.is_some() {
                    config.reachability.dest = dest;
                }
            }
            Command::Knn {
                source,
                k,
                runs,
                max_in_flight,
                seed,
            } => {
                if source.is_some() {
                    config.sampling.source = source;
                }
                if let Some(k) = k {
                    config.sampling.k = k;
                }
                if let Some(n) = runs {
                    config.sampling.runs = n;
                }
                if let Some(n) = max_in_flight {
                    config.sampling.max_in_flight = n;
                }
                if seed.is_some() {
                    config.sampling.seed = seed;
                }
            }
        }
        Ok(config)
    }

    fn algorithm(&self, config: &RunConfig) -> Result<Algorithm> {
        let algorithm = match self.command {
            Command::Reachability { .. } => Algorithm::reachability(config)?,
            Command::Knn { .. } => Algorithm::knn(config)?,
        };
        Ok(algorithm)
    }
}

// ── Main ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = cli.run_config()?;
    config.log_summary();

    let algorithm = cli.algorithm(&config)?;

    let Some(path) = config.graph.path.as_ref() else {
        bail!("no graph given: pass --graph, set VCGRAPH_GRAPH or [graph].path");
    };
    let mut graph = load_edge_list_with_limit(path, config.graph.max_vertices)
        .with_context(|| format!("failed to load graph {}", path.display()))?;
    if let Some(n) = config.graph.vertices {
        if n as usize > config.graph.max_vertices {
            bail!(
                "--vertices {} exceeds max_vertices {}",
                n,
                config.graph.max_vertices
            );
        }
        graph.ensure_vertices(n as usize);
    }
    let stats = graph.stats();
    info!(
        vertices = stats.vertex_count,
        edges = stats.edge_count,
        isolated = stats.isolated_count,
        max_out_degree = stats.max_out_degree,
        max_in_degree = stats.max_in_degree,
        "graph ready"
    );

    let report = algorithm
        .run(&graph, &config.engine)
        .with_context(|| format!("{} failed", algorithm.name()))?;

    if cli.json {
        let doc = serde_json::json!({
            "config": config.summary(),
            "graph": stats,
            "result": report,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        for line in report.lines() {
            println!("{}", line);
        }
    }

    if !report.is_determined() {
        warn!(
            iterations = report.summary().iterations,
            "iteration budget exhausted before an answer; raise --niters"
        );
        bail!("no answer within {} iterations", config.engine.iterations);
    }
    if let AlgorithmReport::Knn { neighbors, k, .. } = &report {
        if neighbors.len() < *k {
            info!(found = neighbors.len(), k, "fewer reachable vertices than requested");
        }
    }
    Ok(())
}
