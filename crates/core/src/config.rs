use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::VertexId;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Prefix for every environment override.
const ENV_PREFIX: &str = "VCGRAPH";

fn env_opt(key: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, key))
        .ok()
        .filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, CoreError> {
    match env_opt(key) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| CoreError::InvalidConfig {
            key: format!("{}_{}", ENV_PREFIX, key),
            value: raw,
        }),
    }
}

fn env_bool(key: &str) -> Result<Option<bool>, CoreError> {
    match env_opt(key) {
        None => Ok(None),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Ok(Some(true)),
            "0" | "false" | "off" | "no" => Ok(Some(false)),
            _ => Err(CoreError::InvalidConfig {
                key: format!("{}_{}", ENV_PREFIX, key),
                value: raw,
            }),
        },
    }
}

// ── Top-level config ──────────────────────────────────────────

/// Everything a run needs, typically parsed from TOML and then
/// overridden by `VCGRAPH_*` env vars and CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub reachability: ReachabilityConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

impl RunConfig {
    /// Parse a TOML config file. Missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `VCGRAPH_*` environment overrides on top of the current values
    /// (call `load_dotenv()` first).
    pub fn apply_env(&mut self) -> Result<(), CoreError> {
        if let Some(path) = env_opt("GRAPH") {
            self.graph.path = Some(PathBuf::from(path));
        }
        if let Some(n) = env_parse("VERTICES")? {
            self.graph.vertices = Some(n);
        }
        if let Some(n) = env_parse("MAX_VERTICES")? {
            self.graph.max_vertices = n;
        }
        if let Some(n) = env_parse("NITERS")? {
            self.engine.iterations = n;
        }
        if let Some(on) = env_bool("SCHEDULER")? {
            self.engine.scheduler = on;
        }
        if let Some(n) = env_parse("THREADS")? {
            self.engine.worker_threads = n;
        }
        if let Some(n) = env_parse("INTERVALS")? {
            self.engine.intervals = n;
        }
        if let Some(id) = env_parse("SOURCE")? {
            self.reachability.source = Some(id);
            self.sampling.source = Some(id);
        }
        if let Some(id) = env_parse("DEST")? {
            self.reachability.dest = Some(id);
        }
        if let Some(k) = env_parse("K")? {
            self.sampling.k = k;
        }
        if let Some(n) = env_parse("RUNS")? {
            self.sampling.runs = n;
        }
        if let Some(n) = env_parse("MAX_IN_FLIGHT")? {
            self.sampling.max_in_flight = n;
        }
        if let Some(seed) = env_parse("SEED")? {
            self.sampling.seed = Some(seed);
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  graph:        path={}, max_vertices={}",
            self.graph
                .path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string()),
            self.graph.max_vertices
        );
        tracing::info!(
            "  engine:       niters={}, scheduler={}, threads={}, intervals={}",
            self.engine.iterations,
            self.engine.scheduler,
            self.engine.resolved_worker_threads(),
            self.engine.resolved_intervals()
        );
        tracing::info!(
            "  reachability: source={:?}, dest={:?}",
            self.reachability.source,
            self.reachability.dest
        );
        tracing::info!(
            "  sampling:     source={:?}, k={}, runs={}, max_in_flight={}, seed={:?}",
            self.sampling.source,
            self.sampling.k,
            self.sampling.runs,
            self.sampling.max_in_flight,
            self.sampling.seed
        );
    }

    /// JSON view of the effective settings, embedded in `--json` output.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "graph": {
                "path": self.graph.path,
                "vertices": self.graph.vertices,
                "max_vertices": self.graph.max_vertices,
            },
            "engine": {
                "iterations": self.engine.iterations,
                "scheduler": self.engine.scheduler,
                "worker_threads": self.engine.resolved_worker_threads(),
                "intervals": self.engine.resolved_intervals(),
            },
        })
    }
}

// ── Graph input ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Edge-list file.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Reserve at least this many vertices (isolated trailing ids).
    #[serde(default)]
    pub vertices: Option<u32>,
    /// Upper bound on the vertex count; larger ids are rejected on load.
    #[serde(default = "default_max_vertices")]
    pub max_vertices: usize,
}

fn default_max_vertices() -> usize {
    1 << 26
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            path: None,
            vertices: None,
            max_vertices: default_max_vertices(),
        }
    }
}

// ── Engine ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Iteration budget (iterations 0..iterations).
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Selective scheduling. When off every vertex runs every iteration.
    #[serde(default = "default_scheduler")]
    pub scheduler: bool,
    /// Number of worker threads. 0 = available parallelism.
    #[serde(default)]
    pub worker_threads: usize,
    /// Number of id intervals per iteration. 0 = four per worker.
    #[serde(default)]
    pub intervals: usize,
}

fn default_iterations() -> usize {
    1000
}

fn default_scheduler() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            scheduler: default_scheduler(),
            worker_threads: 0,
            intervals: 0,
        }
    }
}

impl EngineConfig {
    /// Resolve worker thread count (0 means use available parallelism).
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.worker_threads
        }
    }

    pub fn resolved_intervals(&self) -> usize {
        if self.intervals == 0 {
            self.resolved_worker_threads() * 4
        } else {
            self.intervals
        }
    }
}

// ── Algorithms ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReachabilityConfig {
    #[serde(default)]
    pub source: Option<VertexId>,
    #[serde(default)]
    pub dest: Option<VertexId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default)]
    pub source: Option<VertexId>,
    /// Number of nearest vertices to report.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Total sampling runs started from the source.
    #[serde(default = "default_runs")]
    pub runs: usize,
    /// Runs allowed in flight at the same time.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// Seed for the Bernoulli source. None = seeded from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_k() -> usize {
    10
}

fn default_runs() -> usize {
    64
}

fn default_max_in_flight() -> usize {
    8
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            source: None,
            k: default_k(),
            runs: default_runs(),
            max_in_flight: default_max_in_flight(),
            seed: None,
        }
    }
}
