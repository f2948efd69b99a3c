use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Engine operational metrics, accumulated across runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineMetrics {
    /// Completed runs.
    pub runs: u64,
    /// Iterations executed across all runs.
    pub iterations: u64,
    /// `update` calls across all runs.
    pub updates: u64,
    /// Frontier size of each iteration of the most recent run.
    pub frontier_sizes: Vec<usize>,
    /// Average wall time of one iteration.
    pub avg_iteration_duration: Duration,
    /// When the most recent run finished.
    pub last_run: Option<DateTime<Utc>>,
}

impl EngineMetrics {
    /// Forget the per-run frontier history before a new run.
    pub fn begin_run(&mut self) {
        self.frontier_sizes.clear();
    }

    /// Record one finished iteration.
    pub fn record_iteration(&mut self, frontier: usize, updates: usize, duration: Duration) {
        self.iterations += 1;
        self.updates += updates as u64;
        self.frontier_sizes.push(frontier);

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        self.avg_iteration_duration = if self.iterations == 1 {
            duration
        } else {
            let prev_nanos = self.avg_iteration_duration.as_nanos() as f64;
            let cur_nanos = duration.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / self.iterations as f64;
            Duration::from_nanos(avg_nanos as u64)
        };
    }

    pub fn end_run(&mut self) {
        self.runs += 1;
        self.last_run = Some(Utc::now());
    }
}
