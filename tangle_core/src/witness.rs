//! Witness-chain ledger.
//!
//! A simpler sibling of the tangle: every user extends a private chain, and
//! each new block also links the freshest known block of up to
//! `max_witnesses` other users. There is no random walk; witness choice is
//! a deterministic function of what the user has heard about.

use crate::error::CoreError;
use serde::Serialize;
use std::collections::BTreeSet;
use tangle_env::{NodeId, ProcessId};

/// A block in the witness-chain DAG.
#[derive(Debug, Clone, Serialize)]
pub struct WitnessBlock {
    pub id: NodeId,
    /// Author; `None` for genesis
    pub owner: Option<ProcessId>,
    pub timestamp: f64,
    /// Own-chain parent first, then witnesses
    pub parents: Vec<NodeId>,
    pub children: Vec<NodeId>,
}

/// Append-only store of witness-chain blocks.
#[derive(Debug, Clone)]
pub struct WitnessStore {
    blocks: Vec<WitnessBlock>,
    /// Blocks nobody references yet
    leaves: BTreeSet<NodeId>,
}

impl WitnessStore {
    /// Creates a store with an ownerless genesis block.
    pub fn new() -> Self {
        let mut leaves = BTreeSet::new();
        leaves.insert(NodeId::GENESIS);

        Self {
            blocks: vec![WitnessBlock {
                id: NodeId::GENESIS,
                owner: None,
                timestamp: 0.0,
                parents: Vec::new(),
                children: Vec::new(),
            }],
            leaves,
        }
    }

    /// Appends a block by `owner` and returns its id.
    pub fn append(&mut self, owner: ProcessId, parents: Vec<NodeId>, timestamp: f64) -> Result<NodeId, CoreError> {
        if parents.is_empty() {
            return Err(CoreError::NoParents);
        }
        if let Some(&parent) = parents.iter().find(|p| p.index() >= self.blocks.len()) {
            return Err(CoreError::UnknownParent { parent, len: self.blocks.len() });
        }

        let id = NodeId(self.blocks.len());
        for parent in &parents {
            self.blocks[parent.index()].children.push(id);
            self.leaves.remove(parent);
        }

        self.blocks.push(WitnessBlock {
            id,
            owner: Some(owner),
            timestamp,
            parents,
            children: Vec::new(),
        });
        self.leaves.insert(id);

        Ok(id)
    }

    pub fn block(&self, id: NodeId) -> Option<&WitnessBlock> {
        self.blocks.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &WitnessBlock> {
        self.blocks.iter()
    }

    pub fn leaves(&self) -> &BTreeSet<NodeId> {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }
}

impl Default for WitnessStore {
    fn default() -> Self {
        Self::new()
    }
}

/// One user of the witness-chain simulation.
#[derive(Debug, Clone)]
pub struct WitnessUser {
    pub id: ProcessId,
    /// Latest block of this user's own chain
    pub last_block: Option<NodeId>,
    /// Blocks this user has heard about, ascending
    known: BTreeSet<NodeId>,
}

impl WitnessUser {
    /// Creates a user that knows only genesis.
    pub fn new(id: ProcessId) -> Self {
        let mut known = BTreeSet::new();
        known.insert(NodeId::GENESIS);
        Self { id, last_block: None, known }
    }

    /// Records a delivered block.
    pub fn observe(&mut self, block: NodeId) -> bool {
        self.known.insert(block)
    }

    pub fn knows(&self, block: NodeId) -> bool {
        self.known.contains(&block)
    }

    /// Parent on the user's own chain (genesis before the first block).
    pub fn chain_parent(&self) -> NodeId {
        self.last_block.unwrap_or(NodeId::GENESIS)
    }

    /// Picks witnesses from the user's local knowledge.
    ///
    /// For every other user, takes the most recent block of theirs this user
    /// knows (earliest id wins on equal timestamps), orders those by recency
    /// and keeps at most `max_witnesses`.
    pub fn select_witnesses(&self, store: &WitnessStore, num_users: usize, max_witnesses: usize) -> Vec<NodeId> {
        let mut best: Vec<Option<(NodeId, f64)>> = vec![None; num_users];

        for &id in &self.known {
            let Some(block) = store.block(id) else { continue };
            let Some(owner) = block.owner else { continue };
            if owner == self.id || owner.index() >= num_users {
                continue;
            }
            let newer = match best[owner.index()] {
                Some((_, ts)) => block.timestamp > ts,
                None => true,
            };
            if newer {
                best[owner.index()] = Some((id, block.timestamp));
            }
        }

        let mut candidates: Vec<(NodeId, f64)> = best.into_iter().flatten().collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        candidates
            .into_iter()
            .take(max_witnesses)
            .map(|(id, _)| id)
            .collect()
    }

    /// Builds the parent list for this user's next block.
    pub fn next_parents(&self, store: &WitnessStore, num_users: usize, max_witnesses: usize) -> Vec<NodeId> {
        let chain_parent = self.chain_parent();
        let mut parents = vec![chain_parent];
        for witness in self.select_witnesses(store, num_users, max_witnesses) {
            if witness != chain_parent {
                parents.push(witness);
            }
        }
        parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_block_attaches_to_genesis() {
        let store = WitnessStore::new();
        let user = WitnessUser::new(ProcessId(0));

        assert_eq!(user.next_parents(&store, 3, 3), vec![NodeId::GENESIS]);
    }

    #[test]
    fn test_leaves_follow_chain_growth() {
        let mut store = WitnessStore::new();

        let a = store.append(ProcessId(0), vec![NodeId::GENESIS], 1.0).unwrap();
        let b = store.append(ProcessId(1), vec![NodeId::GENESIS], 1.0).unwrap();
        assert_eq!(store.leaf_count(), 2);

        let c = store.append(ProcessId(0), vec![a, b], 2.0).unwrap();
        assert_eq!(store.leaves().iter().copied().collect::<Vec<_>>(), vec![c]);
        assert_eq!(store.block(a).unwrap().children, vec![c]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_witnesses_latest_per_owner_by_recency() {
        let mut store = WitnessStore::new();
        let u1_old = store.append(ProcessId(1), vec![NodeId::GENESIS], 1.0).unwrap();
        let u2 = store.append(ProcessId(2), vec![NodeId::GENESIS], 2.0).unwrap();
        let u1_new = store.append(ProcessId(1), vec![u1_old], 3.0).unwrap();
        let own = store.append(ProcessId(0), vec![NodeId::GENESIS], 3.0).unwrap();

        let mut user = WitnessUser::new(ProcessId(0));
        user.last_block = Some(own);
        for id in [u1_old, u2, u1_new, own] {
            user.observe(id);
        }

        assert_eq!(user.select_witnesses(&store, 3, 3), vec![u1_new, u2]);
        assert_eq!(user.select_witnesses(&store, 3, 1), vec![u1_new]);
        assert_eq!(user.next_parents(&store, 3, 3), vec![own, u1_new, u2]);
    }

    #[test]
    fn test_witnesses_ignore_unknown_blocks() {
        let mut store = WitnessStore::new();
        let other = store.append(ProcessId(1), vec![NodeId::GENESIS], 1.0).unwrap();

        let user = WitnessUser::new(ProcessId(0));
        assert!(!user.knows(other));
        assert!(user.select_witnesses(&store, 2, 3).is_empty());
    }

    #[test]
    fn test_append_rejects_unknown_parent() {
        let mut store = WitnessStore::new();
        assert_eq!(
            store.append(ProcessId(0), vec![NodeId(4)], 1.0),
            Err(CoreError::UnknownParent { parent: NodeId(4), len: 1 })
        );
    }
}
