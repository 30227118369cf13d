//! Tangle Core - DAG Ledger Growth Engine
//!
//! This library holds the pieces of the tangle simulation that do not depend
//! on how time or delivery is driven:
//! 1. **DAG store**: append-only arena of transactions linked by id
//! 2. **Process views**: partial, delayed knowledge of the DAG per process
//! 3. **Tip selection**: uniform, biased random walk and hybrid strategies
//! 4. **Metrics & validation**: per-tick width metrics and invariant checks
//!
//! The witness-chain variant lives in [`witness`].

pub mod dag;
pub mod error;
pub mod metrics;
pub mod sampler;
pub mod tip_selection;
pub mod validation;
pub mod view;
pub mod witness;

// Re-export key types for convenience
pub use dag::{DagStore, TransactionNode};
pub use error::CoreError;
pub use metrics::{TickMetrics, METRICS_HEADER};
pub use sampler::weighted_choice;
pub use tip_selection::{SelectionStats, TipSelectionMode, TipSelector};
pub use validation::InvariantViolation;
pub use view::ProcessView;
pub use witness::{WitnessBlock, WitnessStore, WitnessUser};
