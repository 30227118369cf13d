//! Witness runner - the witness-chain simulation.
//!
//! Uses the same clock, RNG and delivery queue as the tangle runner. Users
//! extend their own chains and cite the freshest blocks they have heard of
//! from other users; no tip selection is involved.

use crate::config::WitnessConfig;
use crate::error::SimError;
use crate::exporter::{CsvExporter, CsvRecord, MetricsSink, RunSummary};
use crate::network::DeliveryQueue;
use crate::runner::is_progress_tick;
use serde::Serialize;
use std::path::Path;
use tangle_core::validation::check_witness_store;
use tangle_core::{WitnessStore, WitnessUser};
use tangle_env::{ProcessId, RandomSource, SeededRng, SimClock};
use tracing::{debug, info, warn};

/// One row of the witness-chain metrics stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WitnessTickMetrics {
    pub time: f64,
    /// Blocks nobody references yet
    pub global_leaves: usize,
    /// Blocks created so far, genesis included
    pub total_nodes: usize,
}

impl CsvRecord for WitnessTickMetrics {
    const HEADER: &'static str = "time,global_leaves,total_nodes";

    fn to_csv_row(&self) -> String {
        format!("{},{},{}", self.time, self.global_leaves, self.total_nodes)
    }
}

/// Runs one witness-chain simulation from genesis to `sim_duration`.
pub struct WitnessRunner {
    config: WitnessConfig,
    rng: SeededRng,
    clock: SimClock,
    store: WitnessStore,
    users: Vec<WitnessUser>,
    queue: DeliveryQueue,
    check_invariants: bool,
    last_time: f64,
}

impl WitnessRunner {
    /// Validates `config` and builds a runner at tick 0.
    pub fn new(config: WitnessConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            rng: SeededRng::new(config.seed),
            clock: SimClock::default(),
            store: WitnessStore::new(),
            users: (0..config.num_users).map(|i| WitnessUser::new(ProcessId(i))).collect(),
            queue: DeliveryQueue::new(config.min_delay, config.max_delay),
            check_invariants: false,
            last_time: 0.0,
            config,
        })
    }

    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    pub fn store(&self) -> &WitnessStore {
        &self.store
    }

    pub fn users(&self) -> &[WitnessUser] {
        &self.users
    }

    pub fn is_finished(&self) -> bool {
        !self.clock.within(self.config.sim_duration)
    }

    /// Executes one tick: deliver, post, measure.
    pub fn step(&mut self) -> Result<WitnessTickMetrics, SimError> {
        let now = self.clock.now();

        for event in self.queue.drain_due(now) {
            let Some(user) = self.users.get_mut(event.receiver.index()) else {
                warn!("Dropping delivery to unknown user {} at t={}", event.receiver, now);
                continue;
            };
            if event.node.index() >= self.store.len() {
                warn!("Dropping delivery of unknown block {} at t={}", event.node, now);
                continue;
            }
            user.observe(event.node);
        }

        let num_users = self.users.len();
        for i in 0..num_users {
            let r = self.rng.uniform_real(0.0, 1.0);
            if r >= self.config.post_prob_per_step {
                continue;
            }

            let parents = self.users[i].next_parents(&self.store, num_users, self.config.max_witnesses);
            let witnesses = parents.len() - 1;
            let id = self.store.append(ProcessId(i), parents, now)?;

            let user = &mut self.users[i];
            user.last_block = Some(id);
            user.observe(id);
            self.queue.broadcast(id, ProcessId(i), num_users, now, &mut self.rng);

            debug!("t={} {} posted {} with {} witnesses", now, ProcessId(i), id, witnesses);
        }

        if self.check_invariants {
            check_witness_store(&self.store).map_err(|violation| SimError::Invariant { time: now, violation })?;
        }

        let metrics = WitnessTickMetrics {
            time: now,
            global_leaves: self.store.leaf_count(),
            total_nodes: self.store.len(),
        };

        self.last_time = now;
        self.clock.advance();
        Ok(metrics)
    }

    /// Runs every remaining tick, feeding each row to `sink`.
    pub fn run<S: MetricsSink<WitnessTickMetrics>>(&mut self, sink: &mut S) -> Result<RunSummary, SimError> {
        info!(
            "Starting witness run: seed={} users={} max_witnesses={} duration={}",
            self.rng.seed(),
            self.config.num_users,
            self.config.max_witnesses,
            self.config.sim_duration
        );

        while !self.is_finished() {
            let metrics = self.step()?;
            sink.record(&metrics)?;

            if is_progress_tick(metrics.time) {
                info!(
                    "t={} total_nodes={} global_leaves={}",
                    metrics.time, metrics.total_nodes, metrics.global_leaves
                );
            }
        }
        sink.finish()?;

        let summary = self.summary();
        info!(
            "Witness run finished: {} ticks, {} blocks, {} leaves",
            summary.ticks, summary.total_nodes, summary.final_tips
        );
        Ok(summary)
    }

    /// Runs to completion, writing the CSV to `path`.
    pub fn run_to_file(&mut self, path: &Path) -> Result<RunSummary, SimError> {
        let mut exporter = CsvExporter::create(path, WitnessTickMetrics::HEADER)?;
        let summary = self.run(&mut exporter)?;
        Ok(summary.with_output(path))
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            simulation: "witness".to_string(),
            seed: self.rng.seed(),
            ticks: self.clock.ticks(),
            final_time: self.last_time,
            total_nodes: self.store.len(),
            final_tips: self.store.leaf_count(),
            messages_sent: self.queue.messages_sent(),
            mode: None,
            selection: None,
            output: None,
        }
    }
}
