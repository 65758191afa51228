//! Deadlock-free acquisition of "whichever tree currently owns this vertex".
//!
//! # Architecture
//!
//! Workers never block on a tree lock while holding a vertex lock. Both
//! protocols here follow the same loop:
//!
//! 1. lock the vertex and read its owner;
//! 2. *try* the owner's tree lock; success returns with the tree lock held
//!    (the vertex lock is released; membership is now pinned by the tree
//!    lock instead);
//! 3. on failure, release the vertex lock, wait for the tree's release
//!    broadcast, and start over; the owner may be a different tree by then.
//!
//! The two-tree variant additionally try-locks the pair in ascending tree-id
//! order, so two workers racing to claim endpoints of the same edge cannot
//! hold one tree each and wait for the other.

use std::sync::Arc;

use parking_lot::MutexGuard;

use crate::graph::{Graph, VertexId, VertexState};
use crate::tree::{Tree, TreeGuard};

/// Result of locking a vertex or its owning tree.
pub enum VertexClaim<'a> {
    /// The vertex has no owner; its lock is held.
    Free(MutexGuard<'a, VertexState>),
    /// The vertex is owned; the owner's tree lock is held and the vertex
    /// lock has been released.
    Owned(TreeGuard),
}

/// Lock `v` if it is unowned, or the tree that owns it.
pub fn lock_owner_or_vertex(graph: &Graph, v: VertexId) -> VertexClaim<'_> {
    let vertex = graph.vertex(v);
    let mut state = vertex.lock();
    loop {
        let Some(owner) = state.tree.clone() else {
            return VertexClaim::Free(state);
        };
        if let Some(guard) = owner.try_lock() {
            // Owner confirmed current while the vertex lock was held.
            return VertexClaim::Owned(guard);
        }
        drop(state);
        owner.wait_released();
        state = vertex.lock();
    }
}

/// Result of locking an edge target on behalf of a growing tree.
pub enum EdgeClaim<'a> {
    /// The target is unowned; its vertex lock is held. The growing tree is
    /// *not* locked.
    Unowned(MutexGuard<'a, VertexState>),
    /// The target already belongs to the growing tree, whose lock is held.
    SameTree(TreeGuard),
    /// The target belongs to another tree; both tree locks are held.
    TwoTrees { ours: TreeGuard, theirs: TreeGuard },
}

/// Lock what is needed to attach `v` to `ours`: the vertex alone if it is
/// unowned, or otherwise the owning tree together with `ours` (both
/// acquired, lower tree id first).
pub fn lock_trees_or_vertex<'a>(
    graph: &'a Graph,
    ours: &Arc<Tree>,
    v: VertexId,
) -> EdgeClaim<'a> {
    let vertex = graph.vertex(v);
    let mut state = vertex.lock();
    loop {
        let Some(theirs) = state.tree.clone() else {
            return EdgeClaim::Unowned(state);
        };
        if Arc::ptr_eq(&theirs, ours) {
            if let Some(guard) = ours.try_lock() {
                return EdgeClaim::SameTree(guard);
            }
            drop(state);
            ours.wait_released();
        } else {
            let ours_first = ours.id() < theirs.id();
            let (first, second) = if ours_first {
                (ours, &theirs)
            } else {
                (&theirs, ours)
            };
            if let Some(first_guard) = first.try_lock() {
                if let Some(second_guard) = second.try_lock() {
                    let (our_guard, their_guard) = if ours_first {
                        (first_guard, second_guard)
                    } else {
                        (second_guard, first_guard)
                    };
                    return EdgeClaim::TwoTrees {
                        ours: our_guard,
                        theirs: their_guard,
                    };
                }
                drop(first_guard);
                drop(state);
                second.wait_released();
            } else {
                drop(state);
                first.wait_released();
            }
        }
        state = vertex.lock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Colour;
    use crate::tree::TreeStatus;
    use std::time::Duration;

    fn claim(graph: &Graph, v: VertexId, tree: &Arc<Tree>) {
        let mut state = graph.vertex(v).lock();
        state.colour = Colour::Red;
        state.tree = Some(Arc::clone(tree));
        tree.lock().push_member(v);
    }

    #[test]
    fn test_unowned_vertex_claims_free() {
        let graph = Graph::from_edges(2, &[(0, 1)]).unwrap();
        match lock_owner_or_vertex(&graph, 0) {
            VertexClaim::Free(state) => assert!(state.tree.is_none()),
            VertexClaim::Owned(_) => panic!("vertex 0 has no owner"),
        };
    }

    #[test]
    fn test_owned_vertex_claims_owner() {
        let graph = Graph::from_edges(2, &[(0, 1)]).unwrap();
        let tree = Tree::new(graph.allocate_tree_id(), 0, 1);
        claim(&graph, 0, &tree);

        match lock_owner_or_vertex(&graph, 0) {
            VertexClaim::Owned(guard) => {
                assert_eq!(guard.id(), tree.id());
                assert_eq!(guard.status(), TreeStatus::Growing);
            }
            VertexClaim::Free(_) => panic!("vertex 0 is owned"),
        }
        // The guard dropped above; the tree lock must be free again.
        assert!(tree.try_lock().is_some());
    }

    #[test]
    fn test_claim_waits_for_held_owner() {
        let graph = Graph::from_edges(2, &[(0, 1)]).unwrap();
        let tree = Tree::new(graph.allocate_tree_id(), 0, 1);
        claim(&graph, 0, &tree);

        let held = tree.lock();
        std::thread::scope(|scope| {
            let claimer = scope.spawn(|| match lock_owner_or_vertex(&graph, 0) {
                VertexClaim::Owned(guard) => guard.id(),
                VertexClaim::Free(_) => panic!("vertex 0 is owned"),
            });
            std::thread::sleep(Duration::from_millis(20));
            drop(held);
            assert_eq!(claimer.join().unwrap(), tree.id());
        });
    }

    #[test]
    fn test_edge_claim_distinguishes_same_and_other_tree() {
        let graph = Graph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let ours = Tree::new(graph.allocate_tree_id(), 0, 1);
        let theirs = Tree::new(graph.allocate_tree_id(), 2, 2);
        claim(&graph, 0, &ours);
        claim(&graph, 2, &theirs);

        match lock_trees_or_vertex(&graph, &ours, 1) {
            EdgeClaim::Unowned(state) => assert!(state.tree.is_none()),
            _ => panic!("vertex 1 has no owner"),
        }
        match lock_trees_or_vertex(&graph, &ours, 0) {
            EdgeClaim::SameTree(guard) => assert_eq!(guard.id(), ours.id()),
            _ => panic!("vertex 0 is ours"),
        }
        match lock_trees_or_vertex(&graph, &ours, 2) {
            EdgeClaim::TwoTrees {
                ours: our_guard,
                theirs: their_guard,
            } => {
                assert_eq!(our_guard.id(), ours.id());
                assert_eq!(their_guard.id(), theirs.id());
            }
            _ => panic!("vertex 2 belongs to the other tree"),
        }
        // Both guards dropped; both locks free again.
        assert!(ours.try_lock().is_some());
        assert!(theirs.try_lock().is_some());
    }
}
