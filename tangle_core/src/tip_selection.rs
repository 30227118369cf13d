//! Tip Selection Engine
//! ====================
//!
//! Chooses the parents of a new transaction using only the requesting
//! process's local view:
//! - **Uniform**: a uniformly random local tip
//! - **Biased walk**: a random walk from genesis over known children,
//!   weighted by `exp(alpha * height)` so deeper branches are preferred
//! - **Hybrid**: per selected tip, the walk with probability
//!   `security_bias`, otherwise uniform
//!
//! The walk stops at a node with no *known* child, which may still have
//! children the process has not heard of yet.

use crate::dag::DagStore;
use crate::error::CoreError;
use crate::sampler::weighted_choice;
use crate::view::ProcessView;
use serde::{Deserialize, Serialize};
use tangle_env::{NodeId, RandomSource};

// =============================================================================
// MODE
// =============================================================================

/// Tip-selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipSelectionMode {
    /// Uniform over local tips only
    RandomOnly,
    /// Biased walk only
    McmcOnly,
    /// Per-tip mix of both
    Hybrid,
}

impl TipSelectionMode {
    /// Returns the canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            TipSelectionMode::RandomOnly => "RANDOM_ONLY",
            TipSelectionMode::McmcOnly => "MCMC_ONLY",
            TipSelectionMode::Hybrid => "HYBRID",
        }
    }

    pub fn all() -> Vec<TipSelectionMode> {
        vec![
            TipSelectionMode::RandomOnly,
            TipSelectionMode::McmcOnly,
            TipSelectionMode::Hybrid,
        ]
    }
}

impl std::fmt::Display for TipSelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for TipSelectionMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "random_only" | "random" | "uniform" => Ok(TipSelectionMode::RandomOnly),
            "mcmc_only" | "mcmc" | "walk" => Ok(TipSelectionMode::McmcOnly),
            "hybrid" => Ok(TipSelectionMode::Hybrid),
            _ => Err(CoreError::UnknownMode(s.to_string())),
        }
    }
}

// =============================================================================
// INSTRUMENTATION
// =============================================================================

/// Counters describing how tips were chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectionStats {
    /// Tips picked uniformly from the local tip set
    pub uniform_picks: u64,
    /// Uniform picks that fell back to genesis on an empty tip set
    pub genesis_fallbacks: u64,
    /// Biased walks started
    pub walks: u64,
    /// Hops taken across all walks
    pub walk_hops: u64,
    /// Calls into the weighted sampler
    pub sampler_calls: u64,
}

// =============================================================================
// SELECTOR
// =============================================================================

/// Tip selector configured with a strategy and its parameters.
#[derive(Debug, Clone)]
pub struct TipSelector {
    mode: TipSelectionMode,
    /// Probability of using the walk in hybrid mode
    security_bias: f64,
    /// Exponent of the height bias
    alpha: f64,
    stats: SelectionStats,
}

impl TipSelector {
    pub fn new(mode: TipSelectionMode, security_bias: f64, alpha: f64) -> Self {
        Self {
            mode,
            security_bias,
            alpha,
            stats: SelectionStats::default(),
        }
    }

    pub fn mode(&self) -> TipSelectionMode {
        self.mode
    }

    pub fn stats(&self) -> SelectionStats {
        self.stats
    }

    /// Selects `num_tips` parents from `view`, in order.
    ///
    /// Selections are independent, so the same id may appear more than once.
    pub fn select_tips<R: RandomSource + ?Sized>(
        &mut self,
        view: &ProcessView,
        dag: &DagStore,
        rng: &mut R,
        num_tips: usize,
    ) -> Vec<NodeId> {
        let mut tips = Vec::with_capacity(num_tips);

        for _ in 0..num_tips {
            let tip = match self.mode {
                TipSelectionMode::RandomOnly => self.uniform_tip(view, rng),
                TipSelectionMode::McmcOnly => self.biased_walk(view, dag, rng),
                TipSelectionMode::Hybrid => {
                    let r = rng.uniform_real(0.0, 1.0);
                    if r < self.security_bias {
                        self.biased_walk(view, dag, rng)
                    } else {
                        self.uniform_tip(view, rng)
                    }
                }
            };
            tips.push(tip);
        }

        tips
    }

    /// Picks a local tip uniformly; genesis if the process knows no tip.
    pub fn uniform_tip<R: RandomSource + ?Sized>(&mut self, view: &ProcessView, rng: &mut R) -> NodeId {
        self.stats.uniform_picks += 1;

        let tips = view.tips();
        if tips.is_empty() {
            self.stats.genesis_fallbacks += 1;
            return NodeId::GENESIS;
        }

        let k = rng.uniform_int(0, tips.len() - 1);
        tips.iter().nth(k).copied().unwrap_or(NodeId::GENESIS)
    }

    /// Walks from genesis towards a local leaf, biased to greater height.
    pub fn biased_walk<R: RandomSource + ?Sized>(
        &mut self,
        view: &ProcessView,
        dag: &DagStore,
        rng: &mut R,
    ) -> NodeId {
        self.stats.walks += 1;
        let mut current = NodeId::GENESIS;

        loop {
            let Some(node) = dag.node(current) else {
                return current;
            };

            let known_children: Vec<NodeId> = node
                .children
                .iter()
                .copied()
                .filter(|c| view.knows(*c))
                .collect();

            if known_children.is_empty() {
                return current;
            }

            let weights: Vec<f64> = known_children
                .iter()
                .map(|c| {
                    let height = dag.node(*c).map(|n| n.height).unwrap_or(0);
                    (self.alpha * height as f64).exp()
                })
                .collect();

            self.stats.sampler_calls += 1;
            let idx = weighted_choice(&weights, rng).unwrap_or(0);
            current = known_children[idx];
            self.stats.walk_hops += 1;
        }
    }
}
