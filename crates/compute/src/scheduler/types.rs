use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Why the iteration loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The iteration budget was used up.
    IterationCap,
    /// The program called `set_last_iteration`.
    LastIterationSet,
    /// No vertex was scheduled after an iteration.
    NoActiveVertices,
}

/// Result of one engine run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Name of the program that ran.
    pub program: String,
    /// Iterations executed, including iteration 0.
    pub iterations: usize,
    pub stop_reason: StopReason,
    /// Total `update` calls across all iterations.
    pub updates: usize,
    pub duration: Duration,
}

impl RunSummary {
    /// Index of the last iteration that ran, if any.
    pub fn last_iteration(&self) -> Option<usize> {
        self.iterations.checked_sub(1)
    }
}
