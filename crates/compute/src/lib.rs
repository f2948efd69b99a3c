//! vcgraph-compute: the vertex-centric iteration engine and the programs it runs.
//!
//! - [`scheduler`]: task scheduler, iteration driver, vertex/edge views
//! - [`algorithms`]: directed reachability and sampled k-nearest-neighbors
//! - [`engine`]: startup dispatch from configuration to a program run

pub mod algorithms;
pub mod engine;
pub mod scheduler;

pub use algorithms::reachability::{ReachabilityProgram, ReachabilityStatus};
pub use algorithms::sampling::{Neighbor, SampledEdge, SamplingEngine, SamplingSettings};
pub use engine::{Algorithm, AlgorithmReport};
pub use scheduler::{
    ComputeError, Context, Engine, EngineMetrics, RunSummary, StopReason, TaskScheduler,
    VertexProgram,
};
