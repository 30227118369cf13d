//! Per-process partial view of the DAG.

use crate::dag::DagStore;
use std::collections::{BTreeSet, HashSet};
use tangle_env::{NodeId, ProcessId};

/// What one process currently knows about the tangle.
///
/// A process learns transactions one at a time, possibly out of causal
/// order, and tracks which of the transactions it knows have no known child.
/// Those local tips may already be covered in the global graph.
#[derive(Debug, Clone)]
pub struct ProcessView {
    /// Stable index into the process list
    pub id: ProcessId,

    /// Every transaction this process has observed
    known: HashSet<NodeId>,

    /// Known transactions with no known child, in ascending id order
    tips: BTreeSet<NodeId>,
}

impl ProcessView {
    /// Creates a view that knows only genesis.
    pub fn new(id: ProcessId) -> Self {
        let mut known = HashSet::new();
        known.insert(NodeId::GENESIS);
        let mut tips = BTreeSet::new();
        tips.insert(NodeId::GENESIS);

        Self { id, known, tips }
    }

    /// Records that this process has learned about `node`.
    ///
    /// Idempotent. Known parents stop being local tips; the node becomes a
    /// local tip unless one of its children was learned earlier. Returns
    /// `true` if the node was new to this process. Ids outside the store are
    /// ignored.
    pub fn observe(&mut self, dag: &DagStore, node: NodeId) -> bool {
        let Some(tx) = dag.node(node) else {
            return false;
        };
        if !self.known.insert(node) {
            return false;
        }

        for parent in &tx.parents {
            if self.known.contains(parent) {
                self.tips.remove(parent);
            }
        }

        let has_known_child = tx.children.iter().any(|c| self.known.contains(c));
        if !has_known_child {
            self.tips.insert(node);
        }
        true
    }

    pub fn knows(&self, node: NodeId) -> bool {
        self.known.contains(&node)
    }

    /// Local tips in ascending id order.
    pub fn tips(&self) -> &BTreeSet<NodeId> {
        &self.tips
    }

    pub fn tip_count(&self) -> usize {
        self.tips.len()
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    #[cfg(test)]
    pub(crate) fn tips_mut(&mut self) -> &mut BTreeSet<NodeId> {
        &mut self.tips
    }

    /// Iterates known transactions (unordered).
    pub fn known(&self) -> impl Iterator<Item = &NodeId> {
        self.known.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (DagStore, NodeId, NodeId) {
        let mut dag = DagStore::new();
        let a = dag.create_node(vec![NodeId::GENESIS, NodeId::GENESIS], 1.0).unwrap();
        let b = dag.create_node(vec![a, a], 2.0).unwrap();
        (dag, a, b)
    }

    #[test]
    fn test_new_view_knows_genesis() {
        let view = ProcessView::new(ProcessId(0));
        assert!(view.knows(NodeId::GENESIS));
        assert_eq!(view.tip_count(), 1);
        assert_eq!(view.known_count(), 1);
    }

    #[test]
    fn test_observe_in_causal_order() {
        let (dag, a, b) = chain();
        let mut view = ProcessView::new(ProcessId(0));

        assert!(view.observe(&dag, a));
        assert_eq!(view.tips().iter().copied().collect::<Vec<_>>(), vec![a]);

        assert!(view.observe(&dag, b));
        assert_eq!(view.tips().iter().copied().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_observe_out_of_order() {
        let (dag, a, b) = chain();
        let mut view = ProcessView::new(ProcessId(1));

        // Child first: parent `a` is unknown so genesis stays a tip
        view.observe(&dag, b);
        assert!(view.tips().contains(&b));
        assert!(view.tips().contains(&NodeId::GENESIS));

        // Parent arrives late: it already has a known child, so it is no tip,
        // and genesis is now covered.
        view.observe(&dag, a);
        assert_eq!(view.tips().iter().copied().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_observe_idempotent() {
        let (dag, a, _) = chain();
        let mut view = ProcessView::new(ProcessId(0));

        assert!(view.observe(&dag, a));
        assert!(!view.observe(&dag, a));
        assert_eq!(view.known_count(), 2);
        assert_eq!(view.tip_count(), 1);
    }

    #[test]
    fn test_observe_unknown_id_ignored() {
        let (dag, _, _) = chain();
        let mut view = ProcessView::new(ProcessId(0));

        assert!(!view.observe(&dag, NodeId(99)));
        assert!(!view.knows(NodeId(99)));
    }
}
