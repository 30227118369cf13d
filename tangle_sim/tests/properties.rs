//! Property tests over randomly drawn run configurations.

use proptest::prelude::*;
use tangle_core::{TickMetrics, TipSelectionMode, METRICS_HEADER};
use tangle_sim::{
    CsvExporter, CsvRecord, MetricsRecorder, TangleConfig, TangleRunner, WitnessConfig, WitnessRunner,
    WitnessTickMetrics,
};

fn tangle_config() -> impl Strategy<Value = TangleConfig> {
    (
        1usize..6,
        0.0f64..1.5,
        0.0f64..40.0,
        0.0f64..3.0,
        0.0f64..3.0,
        prop::sample::select(TipSelectionMode::all()),
        0.0f64..=1.0,
        -0.5f64..2.0,
        any::<u64>(),
    )
        .prop_map(
            |(num_processes, lambda, duration, min_delay, spread, mode, bias, alpha, seed)| TangleConfig {
                num_processes,
                lambda_per_process: lambda,
                sim_duration: duration,
                min_delay,
                max_delay: min_delay + spread,
                mode,
                security_bias: bias,
                alpha_high: alpha,
                seed,
                ..Default::default()
            },
        )
}

fn witness_config() -> impl Strategy<Value = WitnessConfig> {
    (1usize..12, 0.0f64..=1.0, 0.0f64..40.0, 0.0f64..3.0, 0.0f64..3.0, 0usize..5, any::<u64>()).prop_map(
        |(num_users, post_prob, duration, min_delay, spread, max_witnesses, seed)| WitnessConfig {
            num_users,
            post_prob_per_step: post_prob,
            sim_duration: duration,
            min_delay,
            max_delay: min_delay + spread,
            max_witnesses,
            seed,
            ..Default::default()
        },
    )
}

fn tangle_csv(config: &TangleConfig) -> Vec<u8> {
    let mut exporter = CsvExporter::new(Vec::new(), METRICS_HEADER).unwrap();
    TangleRunner::new(config.clone()).unwrap().run(&mut exporter).unwrap();
    exporter.into_inner()
}

fn witness_csv(config: &WitnessConfig) -> Vec<u8> {
    let mut exporter = CsvExporter::new(Vec::new(), WitnessTickMetrics::HEADER).unwrap();
    WitnessRunner::new(config.clone()).unwrap().run(&mut exporter).unwrap();
    exporter.into_inner()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_tangle_invariants_hold_every_tick(config in tangle_config()) {
        let mut runner = TangleRunner::new(config.clone()).unwrap().with_invariant_checks(true);
        let mut recorder: MetricsRecorder<TickMetrics> = MetricsRecorder::new();
        let summary = runner.run(&mut recorder);
        prop_assert!(summary.is_ok(), "run failed: {:?}", summary.err());

        let rows = recorder.rows();
        prop_assert_eq!(rows.len(), config.sim_duration.floor() as usize + 1);

        for pair in rows.windows(2) {
            prop_assert!(pair[1].total_nodes >= pair[0].total_nodes);
            prop_assert!(pair[1].messages_sent >= pair[0].messages_sent);
            prop_assert!(pair[1].time > pair[0].time);
        }

        for row in rows {
            prop_assert!(row.global_tips >= 1);
            prop_assert!(row.global_tips <= row.total_nodes);
            prop_assert!(row.min_local_tips <= row.max_local_tips);
            prop_assert!(row.min_local_tips >= 1);
            if config.num_processes == 1 {
                // A lone process always extends its only tip
                prop_assert_eq!(row.global_tips, 1);
            }
            prop_assert_eq!(
                row.messages_sent,
                (config.num_processes as u64 - 1) * (row.total_nodes as u64 - 1)
            );
        }
    }

    #[test]
    fn test_tangle_same_seed_byte_identical(config in tangle_config()) {
        prop_assert_eq!(tangle_csv(&config), tangle_csv(&config));
    }

    #[test]
    fn test_witness_invariants_hold_every_tick(config in witness_config()) {
        let mut runner = WitnessRunner::new(config.clone()).unwrap().with_invariant_checks(true);
        let mut recorder: MetricsRecorder<WitnessTickMetrics> = MetricsRecorder::new();
        let summary = runner.run(&mut recorder);
        prop_assert!(summary.is_ok(), "run failed: {:?}", summary.err());

        let rows = recorder.rows();
        prop_assert_eq!(rows.len(), config.sim_duration.floor() as usize + 1);
        for pair in rows.windows(2) {
            prop_assert!(pair[1].total_nodes >= pair[0].total_nodes);
        }

        // Leaves never exceed one chain head per user
        for row in rows {
            prop_assert!(row.global_leaves >= 1);
            prop_assert!(row.global_leaves <= config.num_users.max(1));
        }

        for block in runner.store().blocks().skip(1) {
            prop_assert!(block.parents.len() <= config.max_witnesses + 1);
        }
    }

    #[test]
    fn test_witness_same_seed_byte_identical(config in witness_config()) {
        prop_assert_eq!(witness_csv(&config), witness_csv(&config));
    }
}
