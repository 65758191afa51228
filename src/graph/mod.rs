//! The shared graph store.
//!
//! # Architecture
//!
//! The store separates what never changes from what workers race over:
//!
//! - **Topology** (vertex array, adjacency lists, edge endpoint pairs) is
//!   built once, validated, and then only read.
//! - **Matched bits** live in one `AtomicBool` per undirected edge record,
//!   shared by both directions of the edge, so the matching is symmetric by
//!   construction. The locking protocol (see [`crate::sync`]) guarantees a
//!   bit is only flipped while the relevant vertex or tree locks are held;
//!   the atomic makes concurrent *reads* from other trees well defined.
//! - **Per-vertex search state** sits behind a per-vertex mutex inside
//!   [`Vertex`].
//!
//! Tree identifiers and run counters are allocated here too, so the engine
//! has no process-wide mutable state.

pub mod vertex;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub use vertex::{Colour, EdgeId, EntryEdge, HalfEdge, Vertex, VertexId, VertexState};

use crate::error::{Error, Result};
use crate::stats::Statistics;

/// One undirected edge: its endpoints and the shared matched bit.
#[derive(Debug)]
pub struct EdgeRecord {
    a: VertexId,
    b: VertexId,
    matched: AtomicBool,
}

/// A bipartite graph with a mutable matching.
#[derive(Debug)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<EdgeRecord>,
    next_tree_id: AtomicU64,
    stats: Statistics,
}

impl Graph {
    /// An edgeless graph on `n` vertices.
    pub fn new(n: usize) -> Self {
        Graph {
            vertices: (0..n).map(Vertex::new).collect(),
            edges: Vec::new(),
            next_tree_id: AtomicU64::new(0),
            stats: Statistics::new(),
        }
    }

    /// Add an undirected edge. Fails on self-loops and out-of-range
    /// endpoints; parallel edges are accepted and get their own record.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId> {
        let n = self.vertices.len();
        if a >= n {
            return Err(Error::VertexOutOfRange { id: a, n });
        }
        if b >= n {
            return Err(Error::VertexOutOfRange { id: b, n });
        }
        if a == b {
            return Err(Error::SelfLoop { id: a });
        }
        let edge = self.edges.len();
        self.edges.push(EdgeRecord {
            a,
            b,
            matched: AtomicBool::new(false),
        });
        self.vertices[a].push_half_edge(HalfEdge { to: b, edge });
        self.vertices[b].push_half_edge(HalfEdge { to: a, edge });
        Ok(edge)
    }

    /// Build a graph from an edge list.
    pub fn from_edges(n: usize, edges: &[(VertexId, VertexId)]) -> Result<Self> {
        let mut graph = Graph::new(n);
        for &(a, b) in edges {
            graph.add_edge(a, b)?;
        }
        Ok(graph)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    /// Incident half-edges of `id`, in insertion order.
    pub fn neighbours(&self, id: VertexId) -> &[HalfEdge] {
        self.vertices[id].neighbours()
    }

    /// Endpoints of an undirected edge, as inserted.
    pub fn endpoints(&self, edge: EdgeId) -> (VertexId, VertexId) {
        let record = &self.edges[edge];
        (record.a, record.b)
    }

    /// Whether `edge` is currently in the matching.
    pub fn is_matched(&self, edge: EdgeId) -> bool {
        self.edges[edge].matched.load(Ordering::Acquire)
    }

    /// Flip `edge` in or out of the matching.
    ///
    /// Callers must hold the locks the protocol assigns to this edge (the
    /// endpoint vertex locks, or the tree locks that pin both endpoints).
    pub fn flip_match(&self, edge: EdgeId) {
        self.edges[edge].matched.fetch_xor(true, Ordering::AcqRel);
    }

    /// Whether any edge incident to `v` is matched.
    pub fn is_covered(&self, v: VertexId) -> bool {
        self.neighbours(v).iter().any(|half| self.is_matched(half.edge))
    }

    /// A fresh, never-reused tree identifier.
    pub fn allocate_tree_id(&self) -> u64 {
        self.next_tree_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// The matched edges as `(low, high)` endpoint pairs, in edge order.
    pub fn matched_pairs(&self) -> Vec<(VertexId, VertexId)> {
        self.edges
            .iter()
            .filter(|record| record.matched.load(Ordering::Acquire))
            .map(|record| (record.a.min(record.b), record.a.max(record.b)))
            .collect()
    }

    /// Number of edges currently matched.
    pub fn matching_size(&self) -> usize {
        self.edges
            .iter()
            .filter(|record| record.matched.load(Ordering::Acquire))
            .count()
    }

    /// Whether the current matched bits form a matching: no vertex is an
    /// endpoint of two matched edges.
    pub fn is_valid_matching(&self) -> bool {
        let mut degree = vec![0usize; self.vertices.len()];
        for record in &self.edges {
            if record.matched.load(Ordering::Acquire) {
                degree[record.a] += 1;
                degree[record.b] += 1;
                if degree[record.a] > 1 || degree[record.b] > 1 {
                    return false;
                }
            }
        }
        true
    }

    /// Clear the matching and all search state, keeping the topology.
    pub fn reset(&mut self) {
        for record in &mut self.edges {
            *record.matched.get_mut() = false;
        }
        for vertex in &mut self.vertices {
            vertex.state_mut().clear();
        }
    }

    /// Id of the tree currently owning `v`, if any. Diagnostic snapshot; the
    /// answer can be stale as soon as the vertex lock is released.
    pub fn owner_id(&self, v: VertexId) -> Option<u64> {
        self.vertices[v].lock().tree.as_ref().map(|tree| tree.id())
    }

    /// Current colour of `v`. Diagnostic snapshot.
    pub fn colour(&self, v: VertexId) -> Colour {
        self.vertices[v].lock().colour
    }

    /// Current entry edge of `v`. Diagnostic snapshot.
    pub fn entry(&self, v: VertexId) -> Option<EntryEdge> {
        self.vertices[v].lock().entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_self_loop() {
        let mut graph = Graph::new(3);
        assert!(matches!(
            graph.add_edge(1, 1),
            Err(Error::SelfLoop { id: 1 })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_endpoint() {
        let mut graph = Graph::new(3);
        assert!(matches!(
            graph.add_edge(0, 3),
            Err(Error::VertexOutOfRange { id: 3, n: 3 })
        ));
    }

    #[test]
    fn test_adjacency_insertion_order() {
        let graph = Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3)]).unwrap();
        let targets: Vec<_> = graph.neighbours(0).iter().map(|h| h.to).collect();
        assert_eq!(targets, vec![1, 2, 3]);
        assert_eq!(graph.neighbours(3), &[HalfEdge { to: 0, edge: 2 }]);
    }

    #[test]
    fn test_matched_bit_shared_by_both_directions() {
        let graph = Graph::from_edges(2, &[(0, 1)]).unwrap();
        let from_zero = graph.neighbours(0)[0].edge;
        let from_one = graph.neighbours(1)[0].edge;
        assert_eq!(from_zero, from_one);

        graph.flip_match(from_zero);
        assert!(graph.is_matched(from_one));
        assert!(graph.is_covered(0));
        assert!(graph.is_covered(1));

        graph.flip_match(from_one);
        assert!(!graph.is_matched(from_zero));
    }

    #[test]
    fn test_matched_pairs_and_validity() {
        let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        graph.flip_match(0);
        graph.flip_match(2);
        assert!(graph.is_valid_matching());
        assert_eq!(graph.matching_size(), 2);
        assert_eq!(graph.matched_pairs(), vec![(0, 1), (2, 3)]);

        graph.flip_match(1); // 1 now doubly covered
        assert!(!graph.is_valid_matching());
    }

    #[test]
    fn test_tree_ids_never_repeat() {
        let graph = Graph::new(1);
        let first = graph.allocate_tree_id();
        let second = graph.allocate_tree_id();
        assert_ne!(first, second);
    }

    #[test]
    fn test_reset_clears_matching_and_state() {
        let mut graph = Graph::from_edges(2, &[(0, 1)]).unwrap();
        graph.flip_match(0);
        graph.vertex(0).lock().colour = Colour::Red;
        graph.reset();
        assert_eq!(graph.matching_size(), 0);
        assert_eq!(graph.colour(0), Colour::White);
        assert_eq!(graph.owner_id(0), None);
    }
}
