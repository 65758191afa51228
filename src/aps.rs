//! The augmenting-path search engine.
//!
//! # Architecture
//!
//! [`grow`] runs one tree to completion. It extends a breadth-first frontier
//! of RED vertices: for each RED vertex it tries every unmatched incident
//! edge, attaching the target as BLUE; a BLUE vertex with no matched edge
//! ends the search with an augmenting path, otherwise its matched partner is
//! attached as RED and queued.
//!
//! Every attachment goes through [`add_node_to_tree`], which resolves what
//! the target vertex currently is: unowned (claim it), already ours
//! (ignore), held by an exhausted tree (ignore: its matched alternatives
//! are provably useless), held by a tree being torn down (claim it), or held
//! by another *growing* tree. That last case is a conflict, settled under
//! both tree locks: equal colours mean the two root-to-vertex paths plus the
//! connecting edge form one augmenting path, which is applied immediately to
//! both trees; unequal colours mark the initiating tree a loser, and it
//! abandons once its frontier drains.
//!
//! The terminal state is decided under the tree lock after the frontier
//! stops, and the owning worker then releases membership for every outcome
//! except exhaustion.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, trace};

use crate::graph::{Colour, EdgeId, EntryEdge, Graph, VertexId};
use crate::stats::Counter;
use crate::sync::{lock_trees_or_vertex, EdgeClaim};
use crate::tree::{Tree, TreeGuard, TreeStatus};

/// Result of one attachment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Target claimed and coloured.
    Added,
    /// Nothing to do over this edge; continue with the next one.
    Ignore,
    /// The growing tree is no longer growing; stop the frontier.
    Abort,
    /// A conflict produced an augmenting path, already applied to both
    /// trees.
    PathFound,
}

/// Terminal outcome of growing one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApsOutcome {
    /// An augmenting path through this tree was applied; the matching grew.
    Path,
    /// The tree is complete and admits no augmenting path. Membership is
    /// retained for the rest of the run.
    Exhausted,
    /// The tree lost a conflict and was dismantled; its root should be
    /// retried.
    Abandoned,
}

/// Try to attach `to` to `ours` over `edge`, whose matched bit must read
/// `want_matched` for the attachment to be the right kind of alternation.
/// `from` is the already-owned source endpoint.
fn add_node_to_tree(
    graph: &Graph,
    ours: &Arc<Tree>,
    from: VertexId,
    to: VertexId,
    edge: EdgeId,
    want_matched: bool,
) -> Step {
    let colour = if want_matched { Colour::Red } else { Colour::Blue };
    match lock_trees_or_vertex(graph, ours, to) {
        EdgeClaim::Unowned(mut to_state) => {
            // Vertex lock held; take our own tree lock to validate and
            // record the claim. Blocking here is safe: the only thread that
            // locks vertices while holding our tree lock is ourselves.
            let guard = ours.lock();
            if guard.status() != TreeStatus::Growing {
                return Step::Abort;
            }
            if graph.is_matched(edge) != want_matched {
                return Step::Ignore;
            }
            to_state.colour = colour;
            to_state.entry = Some(EntryEdge { parent: from, edge });
            to_state.tree = Some(Arc::clone(ours));
            guard.push_member(to);
            trace!("tree {}: claimed vertex {} as {:?}", guard.id(), to, colour);
            Step::Added
        }
        EdgeClaim::SameTree(guard) => {
            if guard.status() != TreeStatus::Growing {
                Step::Abort
            } else {
                Step::Ignore
            }
        }
        EdgeClaim::TwoTrees {
            ours: our_guard,
            theirs: their_guard,
        } => {
            if our_guard.status() != TreeStatus::Growing {
                return Step::Abort;
            }
            if graph.is_matched(edge) != want_matched {
                return Step::Ignore;
            }
            match their_guard.status() {
                // An exhausted tree admits no augmenting path through any of
                // its vertices; the edge is useless.
                TreeStatus::Exhausted => Step::Ignore,
                // The owner lost or finished and is about to be dismantled;
                // the vertex is as good as free. Its lock is not needed: the
                // owner's tree lock pins the membership, and release skips
                // vertices that changed hands.
                TreeStatus::Free => {
                    let mut to_state = graph.vertex(to).lock();
                    to_state.colour = colour;
                    to_state.entry = Some(EntryEdge { parent: from, edge });
                    to_state.tree = Some(Arc::clone(ours));
                    our_guard.push_member(to);
                    trace!(
                        "tree {}: claimed vertex {} from dismantled tree {}",
                        our_guard.id(),
                        to,
                        their_guard.id()
                    );
                    Step::Added
                }
                TreeStatus::Growing => {
                    graph.stats().increment(Counter::Conflicts);
                    let to_colour = graph.vertex(to).lock().colour;
                    let from_colour = graph.vertex(from).lock().colour;
                    if from_colour == to_colour {
                        // Both root-to-endpoint paths have the same parity,
                        // so path(our root .. from) + edge + path(to .. their
                        // root) alternates and ends at two exposed roots.
                        debug!(
                            "trees {} and {}: augmenting path through conflict edge {}",
                            our_guard.id(),
                            their_guard.id(),
                            edge
                        );
                        graph.flip_match(edge);
                        process_path(graph, &our_guard, from);
                        process_path(graph, &their_guard, to);
                        graph.stats().increment(Counter::AugmentingPaths);
                        Step::PathFound
                    } else {
                        debug!(
                            "tree {}: lost conflict with tree {} at vertex {}",
                            our_guard.id(),
                            their_guard.id(),
                            to
                        );
                        our_guard.set_loser();
                        Step::Ignore
                    }
                }
            }
        }
    }
}

/// Flip the matched bits along the tree path from `end` back to the root,
/// then mark the tree's path processed. The caller holds the tree's lock;
/// the path's vertices are all members of that tree, so their entries are
/// stable. Vertex locks are taken hand over hand to order the flips with
/// concurrent structural reads.
fn process_path(graph: &Graph, guard: &TreeGuard, end: VertexId) {
    let mut current = graph.vertex(end).lock();
    while let Some(entry) = current.entry {
        let parent = graph.vertex(entry.parent).lock();
        graph.flip_match(entry.edge);
        drop(current);
        current = parent;
    }
    drop(current);
    guard.set_status(TreeStatus::Free);
    guard.set_had_path();
}

/// Reset every member the tree still owns. Runs unlocked on the tree side:
/// a vertex that was claimed away by another tree in the meantime is left
/// alone.
fn release_members(graph: &Graph, tree: &Arc<Tree>) {
    let members = {
        let guard = tree.lock();
        guard.take_members()
    };
    for v in members {
        let mut state = graph.vertex(v).lock();
        if state
            .tree
            .as_ref()
            .is_some_and(|owner| Arc::ptr_eq(owner, tree))
        {
            state.clear();
        }
    }
}

/// Grow `tree` from its root until an augmenting path is found, the
/// frontier is exhausted, or the tree abandons after losing a conflict.
///
/// The root must already be claimed for the tree (RED, no entry, member).
/// On return the tree has left `Growing`, and membership has been released
/// unless the outcome is [`ApsOutcome::Exhausted`].
pub fn grow(graph: &Graph, tree: &Arc<Tree>) -> ApsOutcome {
    let mut frontier = VecDeque::from([tree.root()]);
    // Exposed BLUE vertex found by this worker, pending path processing.
    let mut path_end: Option<VertexId> = None;

    'grow: while let Some(x) = frontier.pop_front() {
        // A tree that lost a conflict can only end abandoned; stop growing
        // rather than claim vertices that are about to be released.
        if tree.lock().loser() {
            break;
        }
        for unmatched in graph.neighbours(x) {
            match add_node_to_tree(graph, tree, x, unmatched.to, unmatched.edge, false) {
                Step::Ignore => continue,
                Step::Abort | Step::PathFound => break 'grow,
                Step::Added => {}
            }
            let y = unmatched.to;
            // A matched BLUE vertex has exactly one matched edge; none
            // means y is exposed and the root-to-y path augments.
            let matched = graph
                .neighbours(y)
                .iter()
                .copied()
                .find(|half| graph.is_matched(half.edge));
            let Some(matched) = matched else {
                path_end = Some(y);
                break 'grow;
            };
            match add_node_to_tree(graph, tree, y, matched.to, matched.edge, true) {
                // The matched partner is unavailable; if that was a lost
                // conflict the loser flag now prevents exhaustion.
                Step::Ignore => {}
                Step::Abort | Step::PathFound => break 'grow,
                Step::Added => frontier.push_back(matched.to),
            }
        }
    }

    // Decide the terminal state under the tree lock.
    let outcome = {
        let guard = tree.lock();
        match guard.status() {
            // Another worker finished a conflict path through us.
            TreeStatus::Free => {
                if guard.had_path() {
                    ApsOutcome::Path
                } else {
                    ApsOutcome::Abandoned
                }
            }
            TreeStatus::Exhausted => ApsOutcome::Exhausted,
            TreeStatus::Growing => {
                if let Some(end) = path_end {
                    process_path(graph, &guard, end);
                    graph.stats().increment(Counter::AugmentingPaths);
                    ApsOutcome::Path
                } else if guard.loser() {
                    guard.set_status(TreeStatus::Free);
                    ApsOutcome::Abandoned
                } else {
                    guard.set_status(TreeStatus::Exhausted);
                    ApsOutcome::Exhausted
                }
            }
        }
    };

    match outcome {
        ApsOutcome::Exhausted => {
            graph.stats().increment(Counter::ExhaustedTrees);
            debug!("tree {}: exhausted, retaining members", tree.id());
        }
        ApsOutcome::Path | ApsOutcome::Abandoned => {
            release_members(graph, tree);
            debug!("tree {}: {:?}, members released", tree.id(), outcome);
        }
    }
    outcome
}
