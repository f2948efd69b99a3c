use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::scheduler::task::{ComputeError, Context, VertexProgram, NO_LAST_ITERATION};
use crate::scheduler::types::{RunSummary, StopReason};
use crate::scheduler::vertex::VertexView;

use super::Engine;

impl<P: VertexProgram> Engine<'_, P> {
    /// Run `program` for iterations `0..num_iterations`.
    ///
    /// Every vertex is active before iteration 0. Each iteration calls
    /// `before_iteration`, freezes the active set, updates its vertices
    /// interval by interval (intervals in parallel, ids in ascending order
    /// within one), then calls `after_iteration`. The loop stops at the
    /// budget, after the iteration a program passed to `set_last_iteration`,
    /// or when nothing is scheduled. Any update error aborts the run.
    pub fn run(&mut self, program: &P, num_iterations: usize) -> Result<RunSummary, ComputeError> {
        let start = Instant::now();
        info!(
            "Running {} for at most {} iterations",
            program.name(),
            num_iterations
        );

        self.scheduler.reset();
        self.metrics.begin_run();
        let last_iteration = AtomicUsize::new(NO_LAST_ITERATION);

        let mut stop_reason = StopReason::IterationCap;
        let mut iterations = 0;
        let mut total_updates = 0;

        for iteration in 0..num_iterations {
            let iter_start = Instant::now();
            let ctx = Context::new(
                iteration,
                num_iterations,
                &self.scheduler,
                self.graph,
                &last_iteration,
            );

            program.before_iteration(&ctx)?;
            let frontier = self.scheduler.snapshot();
            let updates = AtomicUsize::new(0);

            let graph = self.graph;
            let state = &self.state;
            let intervals = &self.intervals;
            self.pool.install(|| {
                intervals.par_iter().try_for_each(|&interval| {
                    program.before_interval(interval, &ctx);
                    for id in interval.ids().filter(|&id| frontier.contains(id)) {
                        let vertex = VertexView::new(id, graph, state);
                        program.update(&vertex, &ctx).map_err(|e| match e {
                            ComputeError::UpdateFailed { .. } => e,
                            other => ComputeError::UpdateFailed {
                                vertex: id,
                                iteration,
                                reason: other.to_string(),
                            },
                        })?;
                        updates.fetch_add(1, Ordering::Relaxed);
                    }
                    program.after_interval(interval, &ctx);
                    Ok::<(), ComputeError>(())
                })
            })?;

            program.after_iteration(&ctx)?;

            let updates = updates.into_inner();
            total_updates += updates;
            iterations = iteration + 1;
            self.metrics
                .record_iteration(frontier.len(), updates, iter_start.elapsed());
            debug!(
                "{} iteration {}: {} active, {} updates, {} scheduled next",
                program.name(),
                iteration,
                frontier.len(),
                updates,
                self.scheduler.active_count()
            );

            if ctx.last_iteration().is_some_and(|last| iteration >= last) {
                stop_reason = StopReason::LastIterationSet;
                break;
            }
            if self.scheduler.is_empty() {
                stop_reason = StopReason::NoActiveVertices;
                break;
            }
        }

        self.metrics.end_run();
        let summary = RunSummary {
            program: program.name().to_string(),
            iterations,
            stop_reason,
            updates: total_updates,
            duration: start.elapsed(),
        };
        info!(
            "{} finished after {} iterations ({:?}) in {:.3}s",
            summary.program,
            summary.iterations,
            summary.stop_reason,
            summary.duration.as_secs_f64()
        );
        Ok(summary)
    }
}
