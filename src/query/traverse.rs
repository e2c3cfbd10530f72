//! Breadth-first closure over typed relations

use super::types::Direction;
use crate::graph::{PersonId, RelationKind};
use crate::storage::{GraphStore, StorageResult};
use std::collections::BTreeSet;

/// Result of a closure computation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureResult {
    /// Nodes first discovered at each hop.
    /// Level 0 = one hop from the starts, level 1 = two hops, etc.
    pub levels: Vec<BTreeSet<PersonId>>,
    /// Every node reached by one or more hops
    pub reached: BTreeSet<PersonId>,
}

impl ClosureResult {
    /// Number of hops that discovered at least one node
    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}

/// Every node reachable from `starts` by following one or more `kind`
/// relations in `direction`
///
/// A start node is part of the result only if it is reachable from some
/// start (including itself, through a cycle).
pub fn closure<S: GraphStore + ?Sized>(
    store: &S,
    starts: &[PersonId],
    kind: RelationKind,
    direction: Direction,
) -> StorageResult<BTreeSet<PersonId>> {
    Ok(closure_with_depth(store, starts, kind, direction, None)?.reached)
}

/// Like [`closure`], but records the hop at which each node was first seen
/// and optionally stops after `max_depth` hops.
pub fn closure_with_depth<S: GraphStore + ?Sized>(
    store: &S,
    starts: &[PersonId],
    kind: RelationKind,
    direction: Direction,
    max_depth: Option<usize>,
) -> StorageResult<ClosureResult> {
    let mut result = ClosureResult::default();

    // Nodes whose neighbours have been (or are about to be) queried.
    let mut expanded: BTreeSet<PersonId> = starts.iter().cloned().collect();
    let mut frontier: Vec<PersonId> = expanded.iter().cloned().collect();

    while !frontier.is_empty() {
        if max_depth.is_some_and(|max| result.levels.len() >= max) {
            break;
        }

        let neighbors = store.neighbors(&frontier, kind, direction)?;

        let mut level = BTreeSet::new();
        let mut next = Vec::new();
        for id in neighbors {
            if result.reached.insert(id.clone()) {
                level.insert(id.clone());
            }
            if expanded.insert(id.clone()) {
                next.push(id);
            }
        }

        if !level.is_empty() {
            result.levels.push(level);
        }
        frontier = next;
    }

    Ok(result)
}
