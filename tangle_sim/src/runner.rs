//! Tangle runner - drives the tick loop of one tangle simulation.

use crate::config::TangleConfig;
use crate::context::SimContext;
use crate::error::SimError;
use crate::exporter::{CsvExporter, CsvRecord, MetricsSink, RunSummary};
use std::path::Path;
use tangle_core::validation::check_all;
use tangle_core::TickMetrics;
use tangle_env::{ProcessId, RandomSource};
use tracing::{debug, info, warn};

/// Parents requested for every new transaction.
pub const PARENTS_PER_TRANSACTION: usize = 2;

/// Simulated time between progress log lines.
const PROGRESS_INTERVAL: u64 = 1000;

/// True for ticks at t = 0, 1000, 2000, ...
pub(crate) fn is_progress_tick(time: f64) -> bool {
    (time as u64) % PROGRESS_INTERVAL == 0
}

/// Runs one tangle simulation from genesis to `sim_duration`.
///
/// Each tick has three phases, always in this order:
/// 1. **Delivery**: every event due by now is observed by its receiver
/// 2. **Generation**: processes in id order may issue one transaction each
/// 3. **Metrics**: one [`TickMetrics`] row is produced
pub struct TangleRunner {
    config: TangleConfig,

    /// All mutable state of the run
    ctx: SimContext,

    /// Run the full invariant checks after every generation phase
    check_invariants: bool,

    /// Time of the last executed tick
    last_time: f64,
}

impl TangleRunner {
    /// Validates `config` and builds a runner at tick 0.
    pub fn new(config: TangleConfig) -> Result<Self, SimError> {
        config.validate()?;
        let ctx = SimContext::new(&config);
        Ok(Self {
            config,
            ctx,
            check_invariants: false,
            last_time: 0.0,
        })
    }

    /// Enables or disables per-tick invariant checks.
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    pub fn config(&self) -> &TangleConfig {
        &self.config
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    /// True once the clock has passed `sim_duration`.
    pub fn is_finished(&self) -> bool {
        !self.ctx.clock.within(self.config.sim_duration)
    }

    /// Executes one tick and advances the clock.
    pub fn step(&mut self) -> Result<TickMetrics, SimError> {
        let now = self.ctx.clock.now();

        self.deliver(now);
        self.generate(now)?;

        if self.check_invariants {
            check_all(&self.ctx.dag, &self.ctx.views).map_err(|violation| SimError::Invariant { time: now, violation })?;
        }

        let metrics = TickMetrics::collect(now, &self.ctx.dag, &self.ctx.views, self.ctx.queue.messages_sent());

        self.last_time = now;
        self.ctx.clock.advance();
        Ok(metrics)
    }

    /// Phase 1: hand every due event to its receiver.
    fn deliver(&mut self, now: f64) {
        let ctx = &mut self.ctx;
        for event in ctx.queue.drain_due(now) {
            let Some(view) = ctx.views.get_mut(event.receiver.index()) else {
                warn!("Dropping delivery to unknown process {} at t={}", event.receiver, now);
                continue;
            };
            if !ctx.dag.contains(event.node) {
                warn!("Dropping delivery of unknown transaction {} at t={}", event.node, now);
                continue;
            }
            view.observe(&ctx.dag, event.node);
        }
    }

    /// Phase 2: every process flips its coin and maybe issues a transaction.
    fn generate(&mut self, now: f64) -> Result<(), SimError> {
        let tx_prob = (self.config.lambda_per_process * self.ctx.clock.dt()).min(1.0);
        let ctx = &mut self.ctx;
        let num_processes = ctx.views.len();

        for i in 0..num_processes {
            let r = ctx.rng.uniform_real(0.0, 1.0);
            if r >= tx_prob {
                continue;
            }

            let parents = ctx
                .selector
                .select_tips(&ctx.views[i], &ctx.dag, &mut ctx.rng, PARENTS_PER_TRANSACTION);
            let id = ctx.dag.create_node(parents, now)?;
            ctx.views[i].observe(&ctx.dag, id);
            ctx.queue.broadcast(id, ProcessId(i), num_processes, now, &mut ctx.rng);

            if let Some(node) = ctx.dag.node(id) {
                debug!(
                    "t={} {} issued {} (height {}, parents {:?})",
                    now,
                    ProcessId(i),
                    id,
                    node.height,
                    node.parents
                );
            }
        }

        Ok(())
    }

    /// Runs every remaining tick, feeding each row to `sink`.
    pub fn run<S: MetricsSink<TickMetrics>>(&mut self, sink: &mut S) -> Result<RunSummary, SimError> {
        info!(
            "Starting tangle run: seed={} processes={} mode={} duration={}",
            self.ctx.seed(),
            self.config.num_processes,
            self.config.mode,
            self.config.sim_duration
        );

        while !self.is_finished() {
            let metrics = self.step()?;
            sink.record(&metrics)?;

            if is_progress_tick(metrics.time) {
                info!(
                    "t={} total_nodes={} global_tips={}",
                    metrics.time, metrics.total_nodes, metrics.global_tips
                );
            }
        }
        sink.finish()?;

        let summary = self.summary();
        info!(
            "Tangle run finished: {} ticks, {} transactions, {} global tips, {} messages",
            summary.ticks, summary.total_nodes, summary.final_tips, summary.messages_sent
        );
        Ok(summary)
    }

    /// Runs to completion, writing the CSV to `path`.
    pub fn run_to_file(&mut self, path: &Path) -> Result<RunSummary, SimError> {
        let mut exporter = CsvExporter::create(path, <TickMetrics as CsvRecord>::HEADER)?;
        let summary = self.run(&mut exporter)?;
        Ok(summary.with_output(path))
    }

    /// Snapshot of the run so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            simulation: "tangle".to_string(),
            seed: self.ctx.seed(),
            ticks: self.ctx.clock.ticks(),
            final_time: self.last_time,
            total_nodes: self.ctx.dag.len(),
            final_tips: self.ctx.dag.global_tip_count(),
            messages_sent: self.ctx.queue.messages_sent(),
            mode: Some(self.config.mode.name().to_string()),
            selection: Some(self.ctx.selector.stats()),
            output: None,
        }
    }
}
