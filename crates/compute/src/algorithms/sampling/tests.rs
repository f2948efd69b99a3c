#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use vcgraph_core::config::EngineConfig;
    use vcgraph_core::VertexId;
    use vcgraph_graph::GraphStore;

    use crate::algorithms::sampling::{SampledEdge, SamplingEngine, SamplingSettings};
    use crate::scheduler::{ComputeError, Engine, StopReason};

    fn serial() -> EngineConfig {
        EngineConfig {
            iterations: 100_000,
            scheduler: true,
            worker_threads: 1,
            intervals: 1,
        }
    }

    fn settings(runs: usize, max_in_flight: usize) -> SamplingSettings {
        SamplingSettings {
            runs,
            max_in_flight,
        }
    }

    fn graph(edges: &[(VertexId, VertexId, f32, f32)]) -> GraphStore {
        let mut g = GraphStore::new();
        for &(s, t, p, w) in edges {
            g.add_edge(s, t, p, w).unwrap();
        }
        g
    }

    #[test]
    fn certain_edges_give_exact_distances() {
        let g = graph(&[(0, 1, 1.0, 1.0), (1, 2, 1.0, 2.0), (2, 3, 1.0, 1.0)]);
        let program = SamplingEngine::with_seed(&g, 0, settings(5, 2), 7).unwrap();
        let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, serial()).unwrap();

        let summary = engine.run(&program, 100_000).unwrap();

        assert_eq!(summary.stop_reason, StopReason::LastIterationSet);
        assert_eq!(program.runs_started().unwrap(), 5);
        assert_eq!(program.runs_completed().unwrap(), 5);
        assert_eq!(program.runs_in_flight().unwrap(), 0);

        let top = program.top_k(10).unwrap();
        let ranked: Vec<(VertexId, f64, u64)> = top
            .iter()
            .map(|n| (n.vertex, n.mean_distance, n.samples))
            .collect();
        assert_eq!(ranked, vec![(1, 1.0, 5), (2, 3.0, 5), (3, 4.0, 5)]);
        assert_eq!(program.top_k(1).unwrap()[0].vertex, 1);
    }

    #[test]
    fn impossible_edge_never_traversed() {
        let g = graph(&[(0, 1, 1.0, 1.0), (0, 2, 0.0, 1.0)]);
        let program = SamplingEngine::with_seed(&g, 0, settings(20, 4), 1).unwrap();
        let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, serial()).unwrap();

        engine.run(&program, 100_000).unwrap();

        assert_eq!(program.value(2).unwrap(), None);
        assert_eq!(program.value(1).unwrap().map(|v| v.count), Some(20));
        assert_eq!(program.reached().unwrap(), 1);
        assert_eq!(engine.state().edge(1), SampledEdge::default());
        assert_eq!(engine.state().edge(0).length, 1.0);
        assert!(engine.state().edge(0).iteration.is_some());
    }

    #[test]
    fn mean_distance_approaches_expectation() {
        // distance to 2 is 1 when the shortcut exists (p = 0.5), else 2
        let g = graph(&[(0, 1, 1.0, 1.0), (1, 2, 1.0, 1.0), (0, 2, 0.5, 1.0)]);
        let program = SamplingEngine::with_seed(&g, 0, settings(2000, 8), 42).unwrap();
        let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, serial()).unwrap();

        engine.run(&program, 100_000).unwrap();

        let value = program.value(2).unwrap().unwrap();
        assert_eq!(value.count, 2000);
        let mean = value.mean().unwrap();
        assert!((mean - 1.5).abs() < 0.1, "mean distance {mean}");
        assert_eq!(program.value(1).unwrap().unwrap().mean(), Some(1.0));
    }

    #[test]
    fn seeded_sessions_replay() {
        let g = graph(&[
            (0, 1, 0.5, 1.0),
            (0, 2, 0.5, 3.0),
            (1, 2, 0.5, 1.0),
            (2, 3, 0.7, 1.0),
            (1, 3, 0.2, 5.0),
        ]);

        let run = |seed: u64| {
            let program = SamplingEngine::with_seed(&g, 0, settings(50, 4), seed).unwrap();
            let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, serial()).unwrap();
            engine.run(&program, 100_000).unwrap();
            program.top_k(3).unwrap()
        };

        assert_eq!(run(99), run(99));
    }

    #[test]
    fn seeded_sessions_replay_across_worker_counts() {
        let mut topology = StdRng::seed_from_u64(7);
        let mut g = GraphStore::with_vertices(200);
        for _ in 0..800 {
            let s = topology.gen_range(0..200);
            let t = topology.gen_range(0..200);
            let p = if topology.gen_bool(0.5) { 0.5 } else { 0.3 };
            let w = topology.gen_range(1..4) as f32;
            g.add_edge(s, t, p, w).unwrap();
        }

        let session = |config: EngineConfig| {
            let program = SamplingEngine::with_seed(&g, 0, settings(50, 8), 99).unwrap();
            let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, config).unwrap();
            engine.run(&program, 100_000).unwrap();
            program.top_k(200).unwrap()
        };
        let parallel = EngineConfig {
            iterations: 100_000,
            scheduler: true,
            worker_threads: 4,
            intervals: 16,
        };

        let first = session(parallel.clone());
        assert!(!first.is_empty());
        for _ in 0..3 {
            assert_eq!(session(parallel.clone()), first);
        }
        assert_eq!(session(serial()), first);
    }

    #[test]
    fn runs_complete_without_selective_scheduling() {
        let g = graph(&[(0, 1, 1.0, 1.0), (1, 2, 1.0, 2.0)]);
        let config = EngineConfig {
            iterations: 1000,
            scheduler: false,
            worker_threads: 2,
            intervals: 2,
        };
        let program = SamplingEngine::with_seed(&g, 0, settings(5, 2), 4).unwrap();
        let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, config).unwrap();

        let summary = engine.run(&program, 1000).unwrap();

        assert_eq!(summary.stop_reason, StopReason::LastIterationSet);
        assert_eq!(program.runs_completed().unwrap(), 5);
        let ranked: Vec<(VertexId, f64, u64)> = program
            .top_k(5)
            .unwrap()
            .iter()
            .map(|n| (n.vertex, n.mean_distance, n.samples))
            .collect();
        assert_eq!(ranked, vec![(1, 1.0, 5), (2, 3.0, 5)]);
    }

    #[test]
    fn source_is_never_ranked() {
        let g = graph(&[(0, 1, 1.0, 1.0), (1, 0, 1.0, 1.0)]);
        let program = SamplingEngine::with_seed(&g, 0, settings(3, 3), 3).unwrap();
        let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, serial()).unwrap();

        engine.run(&program, 100_000).unwrap();

        let ids: Vec<VertexId> = program.top_k(5).unwrap().iter().map(|n| n.vertex).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(program.value(0).unwrap(), None);
    }

    #[test]
    fn in_flight_cap_paces_runs() {
        let g = graph(&[(0, 1, 1.0, 1.0)]);

        // one run at a time: run k starts in iteration 2k + 1
        let program = SamplingEngine::with_seed(&g, 0, settings(4, 1), 0).unwrap();
        let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, serial()).unwrap();
        let summary = engine.run(&program, 100_000).unwrap();
        assert_eq!(summary.iterations, 9);

        // all four overlap: one start per iteration
        let program = SamplingEngine::with_seed(&g, 0, settings(4, 4), 0).unwrap();
        let summary = engine.run(&program, 100_000).unwrap();
        assert_eq!(summary.iterations, 6);
        assert_eq!(program.runs_completed().unwrap(), 4);
    }

    #[test]
    fn zero_runs_stop_after_first_iteration() {
        let g = graph(&[(0, 1, 1.0, 1.0)]);
        let program = SamplingEngine::with_seed(&g, 0, settings(0, 1), 0).unwrap();
        let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, serial()).unwrap();

        let summary = engine.run(&program, 100).unwrap();

        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.stop_reason, StopReason::LastIterationSet);
        assert!(program.top_k(3).unwrap().is_empty());
    }

    #[test]
    fn budget_cuts_sampling_short() {
        let g = graph(&[(0, 1, 1.0, 1.0), (1, 2, 1.0, 1.0)]);
        let program = SamplingEngine::with_seed(&g, 0, settings(100, 2), 5).unwrap();
        let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, serial()).unwrap();

        let summary = engine.run(&program, 10).unwrap();

        assert_eq!(summary.stop_reason, StopReason::IterationCap);
        assert!(program.runs_started().unwrap() < 100);
        // partial answers are still ranked
        assert_eq!(program.top_k(1).unwrap()[0].vertex, 1);
    }

    #[test]
    fn rerun_starts_from_scratch() {
        let g = graph(&[(0, 1, 1.0, 2.0)]);
        let program = SamplingEngine::with_seed(&g, 0, settings(3, 2), 11).unwrap();
        let mut engine: Engine<'_, SamplingEngine> = Engine::new(&g, serial()).unwrap();

        engine.run(&program, 1000).unwrap();
        engine.run(&program, 1000).unwrap();

        assert_eq!(program.runs_started().unwrap(), 3);
        assert_eq!(program.value(1).unwrap().map(|v| v.count), Some(3));
    }

    #[test]
    fn rejects_bad_queries() {
        let g = graph(&[(0, 1, 1.0, 1.0)]);
        assert!(matches!(
            SamplingEngine::new(&g, 5, settings(1, 1)),
            Err(ComputeError::InvalidQuery(_))
        ));
        assert!(matches!(
            SamplingEngine::new(&g, 0, settings(1, 0)),
            Err(ComputeError::InvalidQuery(_))
        ));
    }
}
