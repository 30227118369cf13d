//! Validation Module - Structural Invariants of a Run
//! ==================================================
//!
//! Full recomputation checks for the incrementally maintained state:
//! - global tip set equals the set of childless transactions
//! - every height follows `1 + max(parent heights)`
//! - parents are strictly older than their children
//! - every local tip set is exactly the known transactions with no known child
//! - the witness-chain leaf set equals the set of childless blocks
//!
//! These are O(total size) and meant for tests and `--check-invariants` runs.
//!
//! ```ignore
//! use tangle_core::validation::check_all;
//!
//! check_all(&dag, &views)?;
//! ```

use crate::dag::DagStore;
use crate::view::ProcessView;
use crate::witness::WitnessStore;
use std::collections::BTreeSet;
use tangle_env::{NodeId, ProcessId};
use thiserror::Error;

/// A broken structural invariant.
#[derive(Debug, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("Global tip set has {tracked} entries but {childless} transactions are childless")]
    GlobalTipsMismatch { tracked: usize, childless: usize },

    #[error("{node} has height {actual}, expected {expected}")]
    HeightMismatch { node: NodeId, expected: u64, actual: u64 },

    #[error("{node} references parent {parent} that is not older")]
    ParentNotOlder { node: NodeId, parent: NodeId },

    #[error("{process}: local tip {node} is not a known transaction")]
    UnknownLocalTip { process: ProcessId, node: NodeId },

    #[error("{process}: local tip {node} has known child {child}")]
    CoveredLocalTip { process: ProcessId, node: NodeId, child: NodeId },

    #[error("{process}: {node} has no known child but is missing from the tip set")]
    MissingLocalTip { process: ProcessId, node: NodeId },
}

// =============================================================================
// GLOBAL CHECKS
// =============================================================================

/// Checks the global graph invariants.
pub fn check_dag(dag: &DagStore) -> Result<(), InvariantViolation> {
    let childless: BTreeSet<NodeId> = dag.nodes().filter(|n| n.is_tip()).map(|n| n.id).collect();
    if &childless != dag.global_tips() {
        return Err(InvariantViolation::GlobalTipsMismatch {
            tracked: dag.global_tip_count(),
            childless: childless.len(),
        });
    }

    for node in dag.nodes() {
        let mut expected = 0;
        for parent in &node.parents {
            if parent.index() >= node.id.index() {
                return Err(InvariantViolation::ParentNotOlder {
                    node: node.id,
                    parent: *parent,
                });
            }
            let parent_height = dag.node(*parent).map(|p| p.height).unwrap_or(0);
            expected = expected.max(parent_height + 1);
        }

        if node.height != expected {
            return Err(InvariantViolation::HeightMismatch {
                node: node.id,
                expected,
                actual: node.height,
            });
        }
    }

    Ok(())
}

// =============================================================================
// LOCAL VIEW CHECKS
// =============================================================================

/// Checks that a process's tip set matches its known set.
pub fn check_view(view: &ProcessView, dag: &DagStore) -> Result<(), InvariantViolation> {
    for &tip in view.tips() {
        if !view.knows(tip) {
            return Err(InvariantViolation::UnknownLocalTip { process: view.id, node: tip });
        }
        if let Some(node) = dag.node(tip) {
            if let Some(&child) = node.children.iter().find(|c| view.knows(**c)) {
                return Err(InvariantViolation::CoveredLocalTip {
                    process: view.id,
                    node: tip,
                    child,
                });
            }
        }
    }

    // Sorted so the reported violation does not depend on hash order
    let mut known: Vec<NodeId> = view.known().copied().collect();
    known.sort();
    for id in known {
        let Some(node) = dag.node(id) else { continue };
        let has_known_child = node.children.iter().any(|c| view.knows(*c));
        if !has_known_child && !view.tips().contains(&id) {
            return Err(InvariantViolation::MissingLocalTip { process: view.id, node: id });
        }
    }

    Ok(())
}

/// Checks the global graph and every process view.
pub fn check_all(dag: &DagStore, views: &[ProcessView]) -> Result<(), InvariantViolation> {
    check_dag(dag)?;
    for view in views {
        check_view(view, dag)?;
    }
    Ok(())
}

/// Checks the witness-chain leaf set and parent ordering.
pub fn check_witness_store(store: &WitnessStore) -> Result<(), InvariantViolation> {
    let childless: BTreeSet<NodeId> = store.blocks().filter(|b| b.children.is_empty()).map(|b| b.id).collect();
    if &childless != store.leaves() {
        return Err(InvariantViolation::GlobalTipsMismatch {
            tracked: store.leaf_count(),
            childless: childless.len(),
        });
    }

    for block in store.blocks() {
        if let Some(&parent) = block.parents.iter().find(|p| p.index() >= block.id.index()) {
            return Err(InvariantViolation::ParentNotOlder { node: block.id, parent });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_state_passes() {
        let mut dag = DagStore::new();
        let a = dag.create_node(vec![NodeId::GENESIS, NodeId::GENESIS], 1.0).unwrap();
        let b = dag.create_node(vec![a, NodeId::GENESIS], 2.0).unwrap();

        let mut full = ProcessView::new(ProcessId(0));
        full.observe(&dag, a);
        full.observe(&dag, b);

        // Learned out of order
        let mut partial = ProcessView::new(ProcessId(1));
        partial.observe(&dag, b);

        assert_eq!(check_all(&dag, &[full, partial]), Ok(()));
    }

    #[test]
    fn test_unknown_local_tip_detected() {
        let mut dag = DagStore::new();
        let a = dag.create_node(vec![NodeId::GENESIS, NodeId::GENESIS], 1.0).unwrap();

        let mut view = ProcessView::new(ProcessId(1));
        view.tips_mut().insert(a);

        assert_eq!(
            check_view(&view, &dag),
            Err(InvariantViolation::UnknownLocalTip { process: ProcessId(1), node: a })
        );
    }

    #[test]
    fn test_missing_local_tip_detected() {
        let mut dag = DagStore::new();
        let a = dag.create_node(vec![NodeId::GENESIS, NodeId::GENESIS], 1.0).unwrap();

        let mut view = ProcessView::new(ProcessId(2));
        view.observe(&dag, a);
        view.tips_mut().remove(&a);

        assert_eq!(
            check_view(&view, &dag),
            Err(InvariantViolation::MissingLocalTip { process: ProcessId(2), node: a })
        );
    }

    #[test]
    fn test_covered_local_tip_detected() {
        let mut dag = DagStore::new();
        let a = dag.create_node(vec![NodeId::GENESIS, NodeId::GENESIS], 1.0).unwrap();

        // The view learns `b` from a store where it is a child of genesis only,
        // so `a` stays a tip although it is `b`'s parent in `dag`.
        let mut side = DagStore::new();
        side.create_node(vec![NodeId::GENESIS, NodeId::GENESIS], 1.0).unwrap();
        let b_side = side.create_node(vec![NodeId::GENESIS, NodeId::GENESIS], 1.0).unwrap();

        let b = dag.create_node(vec![a, a], 2.0).unwrap();
        assert_eq!(b, b_side);

        let mut view = ProcessView::new(ProcessId(4));
        view.observe(&dag, a);
        view.observe(&side, b);

        assert_eq!(
            check_view(&view, &dag),
            Err(InvariantViolation::CoveredLocalTip {
                process: ProcessId(4),
                node: a,
                child: b,
            })
        );
    }

    #[test]
    fn test_global_tip_mismatch_detected() {
        let mut dag = DagStore::new();
        dag.create_node(vec![NodeId::GENESIS, NodeId::GENESIS], 1.0).unwrap();
        assert_eq!(check_dag(&dag), Ok(()));

        dag.global_tips_mut().insert(NodeId::GENESIS);
        assert_eq!(
            check_dag(&dag),
            Err(InvariantViolation::GlobalTipsMismatch { tracked: 2, childless: 1 })
        );
    }

    #[test]
    fn test_witness_store_passes() {
        let mut store = WitnessStore::new();
        let a = store.append(ProcessId(0), vec![NodeId::GENESIS], 1.0).unwrap();
        let b = store.append(ProcessId(1), vec![NodeId::GENESIS], 1.0).unwrap();
        store.append(ProcessId(0), vec![a, b], 2.0).unwrap();

        assert_eq!(check_witness_store(&store), Ok(()));
    }
}
