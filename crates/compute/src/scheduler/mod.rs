//! Vertex-centric execution model: task scheduling and the iteration driver.
//!
//! A [`VertexProgram`] is driven by an [`Engine`] over id intervals of a
//! graph. Vertices whose ids are in the [`TaskScheduler`] when an iteration
//! starts are updated in that iteration; programs add and remove ids to shape
//! the next frontier.

pub mod metrics;
pub mod runner;
pub mod state;
pub mod task;
pub mod task_set;
pub mod types;
pub mod vertex;

pub use metrics::EngineMetrics;
pub use runner::Engine;
pub use state::ComputeState;
pub use task::{ComputeError, Context, VertexProgram};
pub use task_set::{Frontier, TaskScheduler};
pub use types::{RunSummary, StopReason};
pub use vertex::{EdgeView, VertexView};
