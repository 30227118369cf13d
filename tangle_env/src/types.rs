//! Common identifier types shared by the tangle crates.

use serde::{Deserialize, Serialize};

/// Identifier of a transaction node in the DAG arena.
///
/// Ids are dense indices assigned in creation order; `0` is always genesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The genesis transaction.
    pub const GENESIS: NodeId = NodeId(0);

    /// Returns the arena index.
    pub fn index(&self) -> usize {
        self.0
    }

    pub fn is_genesis(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx#{}", self.0)
    }
}

/// Identifier of a simulated process (index into the process list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub usize);

impl ProcessId {
    /// Returns the process-list index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}
