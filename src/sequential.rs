//! Single-threaded reference engine.
//!
//! One alternating breadth-first search per exposed vertex, with the same
//! pruning the concurrent engine gets from exhausted trees: a search that
//! finds no augmenting path marks its tree terminal, and later searches skip
//! its vertices.
//!
//! Besides backing the CLI's `--sequential` mode, this doubles as a
//! maximality oracle in tests: a sweep over an existing matching that
//! performs zero augmentations proves the matching maximum, since bipartite
//! graphs have no blossoms to fool the search.

use std::collections::VecDeque;

use crate::graph::{EntryEdge, Graph, VertexId};

/// Augment `graph`'s current matching until it is maximum. Returns the
/// number of augmentations performed.
pub fn augment_to_maximum(graph: &Graph) -> usize {
    let n = graph.vertex_count();
    // Search bookkeeping lives outside the shared store: this engine never
    // touches vertex locks or tree objects.
    let mut owner: Vec<Option<usize>> = vec![None; n];
    let mut exhausted: Vec<bool> = Vec::new();
    let mut entry: Vec<Option<EntryEdge>> = vec![None; n];
    let mut augmentations = 0;

    for root in 0..n {
        if graph.is_covered(root) {
            continue;
        }
        if owner[root].is_some() {
            // Inside an earlier exhausted tree; every non-root member of
            // such a tree is matched, so this can only be a stale root.
            continue;
        }
        let tree = exhausted.len();
        exhausted.push(false);
        owner[root] = Some(tree);
        entry[root] = None;

        let mut frontier = VecDeque::from([root]);
        let mut path_end: Option<VertexId> = None;
        'bfs: while let Some(x) = frontier.pop_front() {
            for unmatched in graph.neighbours(x) {
                if graph.is_matched(unmatched.edge) {
                    continue;
                }
                let y = unmatched.to;
                if skip(&owner, &exhausted, tree, y) {
                    continue;
                }
                owner[y] = Some(tree);
                entry[y] = Some(EntryEdge {
                    parent: x,
                    edge: unmatched.edge,
                });
                let matched = graph
                    .neighbours(y)
                    .iter()
                    .copied()
                    .find(|half| graph.is_matched(half.edge));
                let Some(matched) = matched else {
                    path_end = Some(y);
                    break 'bfs;
                };
                let z = matched.to;
                if skip(&owner, &exhausted, tree, z) {
                    continue;
                }
                owner[z] = Some(tree);
                entry[z] = Some(EntryEdge {
                    parent: y,
                    edge: matched.edge,
                });
                frontier.push_back(z);
            }
        }

        if let Some(end) = path_end {
            let mut v = end;
            while let Some(step) = entry[v] {
                graph.flip_match(step.edge);
                v = step.parent;
            }
            augmentations += 1;
            // Ownership marks of a successful tree go stale; they are
            // claimable again because the tree is not exhausted.
        } else {
            exhausted[tree] = true;
        }
    }
    augmentations
}

/// Whether `v` is unavailable to `tree`: already a member, or held by an
/// exhausted tree.
fn skip(owner: &[Option<usize>], exhausted: &[bool], tree: usize, v: VertexId) -> bool {
    match owner[v] {
        Some(t) => t == tree || exhausted[t],
        None => false,
    }
}
