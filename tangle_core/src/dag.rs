//! DAG Store - Append-only Transaction Arena
//! =========================================
//!
//! Transactions live in a growable vector indexed by [`NodeId`]. Links in
//! both directions are id lists, so the graph owns no pointers and cannot
//! form ownership cycles. New nodes may only reference ids that already
//! exist, which keeps the graph acyclic by construction.

use crate::error::CoreError;
use serde::Serialize;
use std::collections::BTreeSet;
use tangle_env::NodeId;

// =============================================================================
// TRANSACTION NODE
// =============================================================================

/// A single transaction vertex.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionNode {
    /// Arena index (0 = genesis)
    pub id: NodeId,
    /// Tick at which the transaction was created
    pub timestamp: f64,
    /// 0 for genesis, otherwise 1 + max parent height
    pub height: u64,
    /// Parents chosen at creation; may contain duplicates
    pub parents: Vec<NodeId>,
    /// Children in the order they attached
    pub children: Vec<NodeId>,
}

impl TransactionNode {
    fn genesis() -> Self {
        Self {
            id: NodeId::GENESIS,
            timestamp: 0.0,
            height: 0,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// True if no transaction references this one.
    pub fn is_tip(&self) -> bool {
        self.children.is_empty()
    }
}

// =============================================================================
// DAG STORE
// =============================================================================

/// Append-only store of every transaction created during a run.
#[derive(Debug, Clone)]
pub struct DagStore {
    nodes: Vec<TransactionNode>,
    /// Ids whose `children` list is empty
    global_tips: BTreeSet<NodeId>,
}

impl DagStore {
    /// Creates a store holding only the genesis transaction.
    pub fn new() -> Self {
        let mut global_tips = BTreeSet::new();
        global_tips.insert(NodeId::GENESIS);

        Self {
            nodes: vec![TransactionNode::genesis()],
            global_tips,
        }
    }

    /// Appends a transaction referencing `parents` and returns its id.
    ///
    /// Each occurrence of a parent gets a child link, so a duplicated parent
    /// records the new node twice in its `children`.
    pub fn create_node(&mut self, parents: Vec<NodeId>, timestamp: f64) -> Result<NodeId, CoreError> {
        if parents.is_empty() {
            return Err(CoreError::NoParents);
        }

        let mut height = 0;
        for parent in &parents {
            let node = self.nodes.get(parent.index()).ok_or(CoreError::UnknownParent {
                parent: *parent,
                len: self.nodes.len(),
            })?;
            height = height.max(node.height);
        }

        let id = NodeId(self.nodes.len());
        for parent in &parents {
            self.nodes[parent.index()].children.push(id);
            self.global_tips.remove(parent);
        }

        self.nodes.push(TransactionNode {
            id,
            timestamp,
            height: height + 1,
            parents,
            children: Vec::new(),
        });
        self.global_tips.insert(id);

        Ok(id)
    }

    /// Returns the node with the given id, if it exists.
    pub fn node(&self, id: NodeId) -> Option<&TransactionNode> {
        self.nodes.get(id.index())
    }

    /// Returns true if `id` refers to an existing node.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Total number of nodes, genesis included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: genesis exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &TransactionNode> {
        self.nodes.iter()
    }

    /// Current global tips in ascending id order.
    pub fn global_tips(&self) -> &BTreeSet<NodeId> {
        &self.global_tips
    }

    #[cfg(test)]
    pub(crate) fn global_tips_mut(&mut self) -> &mut BTreeSet<NodeId> {
        &mut self.global_tips
    }

    pub fn global_tip_count(&self) -> usize {
        self.global_tips.len()
    }

    /// Height of the deepest transaction.
    pub fn max_height(&self) -> u64 {
        self.nodes.iter().map(|n| n.height).max().unwrap_or(0)
    }
}

impl Default for DagStore {
    fn default() -> Self {
        Self::new()
    }
}
