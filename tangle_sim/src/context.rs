//! Simulation context holding all mutable state of one tangle run.

use crate::config::TangleConfig;
use crate::network::DeliveryQueue;
use tangle_core::{DagStore, ProcessView, TipSelector};
use tangle_env::{ProcessId, RandomSource, SeededRng, SimClock};

/// Everything a run mutates, passed explicitly instead of living in globals.
///
/// This bundles:
/// - A virtual clock that advances one tick at a time
/// - A seeded ChaCha8 RNG that every random draw goes through
/// - The global DAG and one partial view per process
/// - The pending gossip deliveries
pub struct SimContext {
    pub rng: SeededRng,
    pub clock: SimClock,
    pub dag: DagStore,
    pub views: Vec<ProcessView>,
    pub queue: DeliveryQueue,
    pub selector: TipSelector,
}

impl SimContext {
    /// Builds a fresh context: genesis only, every process knowing genesis.
    pub fn new(config: &TangleConfig) -> Self {
        Self {
            rng: SeededRng::new(config.seed),
            clock: SimClock::default(),
            dag: DagStore::new(),
            views: (0..config.num_processes).map(|i| ProcessView::new(ProcessId(i))).collect(),
            queue: DeliveryQueue::new(config.min_delay, config.max_delay),
            selector: TipSelector::new(config.mode, config.security_bias, config.alpha_high),
        }
    }

    /// Master seed of this run.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn num_processes(&self) -> usize {
        self.views.len()
    }
}
