//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use parmatch::graph::Colour;
use parmatch::Graph;

/// A cycle on four vertices: 0-1-2-3-0.
pub fn four_cycle() -> Graph {
    Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap()
}

/// Two vertex-disjoint four-cycles.
pub fn two_four_cycles() -> Graph {
    Graph::from_edges(
        8,
        &[
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
        ],
    )
    .unwrap()
}

/// A single edge.
pub fn single_edge() -> Graph {
    Graph::from_edges(2, &[(0, 1)]).unwrap()
}

/// A star: centre 0, leaves 1..=3.
pub fn star() -> Graph {
    Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3)]).unwrap()
}

/// Complete bipartite graph on `left` + `right` vertices. Left vertices are
/// 0..left, right vertices left..left+right.
pub fn complete_bipartite(left: usize, right: usize) -> Graph {
    let mut edges = Vec::with_capacity(left * right);
    for a in 0..left {
        for b in 0..right {
            edges.push((a, left + b));
        }
    }
    Graph::from_edges(left + right, &edges).unwrap()
}

/// A reproducible random bipartite edge list: `m` distinct edges between
/// 0..left and left..left+right. Returns the vertex count and the edges so
/// callers can build identical graphs more than once.
pub fn random_bipartite(
    left: usize,
    right: usize,
    m: usize,
    seed: u64,
) -> (usize, Vec<(usize, usize)>) {
    assert!(m <= left * right);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut edges = Vec::with_capacity(m);
    while edges.len() < m {
        let a = rng.gen_range(0..left);
        let b = left + rng.gen_range(0..right);
        if seen.insert((a, b)) {
            edges.push((a, b));
        }
    }
    (left + right, edges)
}

/// Check the post-run consistency of vertex ownership: released vertices are
/// fully cleared, and whatever is still owned (members of exhausted trees)
/// looks like a coherent alternating-tree node.
pub fn assert_ownership_consistent(graph: &Graph) {
    for v in 0..graph.vertex_count() {
        let owner = graph.owner_id(v);
        let colour = graph.colour(v);
        let entry = graph.entry(v);
        match owner {
            None => {
                assert_eq!(colour, Colour::White, "released vertex {v} keeps a colour");
                assert_eq!(entry, None, "released vertex {v} keeps an entry edge");
            }
            Some(tree) => {
                assert_ne!(colour, Colour::White, "owned vertex {v} has no colour");
                match colour {
                    Colour::Red if entry.is_none() => {
                        // A retained root: it must still be exposed, or its
                        // tree could not have exhausted.
                        assert!(
                            !graph.is_covered(v),
                            "root {v} of tree {tree} is matched but retained"
                        );
                    }
                    Colour::Blue => {
                        assert!(
                            graph.is_covered(v),
                            "odd vertex {v} of tree {tree} is exposed but no path was taken"
                        );
                    }
                    _ => {}
                }
            }
        }
    }
}
