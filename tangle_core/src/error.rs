//! Error types for the tangle core.

use tangle_env::NodeId;
use thiserror::Error;

/// Errors raised by core operations.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A tip-selection mode name was not recognised
    #[error("Unknown tip selection mode: {0} (expected RANDOM_ONLY, MCMC_ONLY or HYBRID)")]
    UnknownMode(String),

    /// A new node referenced a parent that does not exist yet
    #[error("Parent {parent} does not exist (store has {len} nodes)")]
    UnknownParent { parent: NodeId, len: usize },

    /// A node must reference at least one parent
    #[error("Transaction must reference at least one parent")]
    NoParents,
}
