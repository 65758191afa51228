//! Vertex identity and per-vertex search state.
//!
//! The topology of a vertex (its adjacency list) is immutable once the graph
//! is built. The search state (colour, entry edge, owning tree) lives
//! behind a per-vertex mutex and is only written while that mutex is held
//! (or, for tree members, while the owning tree's lock pins the membership).

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::tree::Tree;

/// Stable vertex identifier: the index into the graph's vertex array.
pub type VertexId = usize;

/// Identifier of an undirected edge: the index of its shared edge record.
pub type EdgeId = usize;

/// Colour of a vertex within an alternating tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    /// Not a member of any tree.
    #[default]
    White,
    /// Even depth: the root, or reached over a matched edge.
    Red,
    /// Odd depth: reached over an unmatched edge.
    Blue,
}

/// One direction of an undirected edge, stored in the source vertex's
/// adjacency list. Both directions of an edge share the same `edge` id and
/// therefore the same matched bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    pub to: VertexId,
    pub edge: EdgeId,
}

/// The edge over which a vertex was attached to its tree. `None` for roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryEdge {
    /// The vertex's parent in the tree.
    pub parent: VertexId,
    /// The undirected edge connecting `parent` to this vertex.
    pub edge: EdgeId,
}

/// Mutable per-vertex fields, protected by the vertex mutex.
#[derive(Debug, Default)]
pub struct VertexState {
    pub colour: Colour,
    pub entry: Option<EntryEdge>,
    pub tree: Option<Arc<Tree>>,
}

impl VertexState {
    /// Return the vertex to the unowned state.
    pub fn clear(&mut self) {
        self.colour = Colour::White;
        self.entry = None;
        self.tree = None;
    }
}

/// A vertex: immutable adjacency plus locked search state.
#[derive(Debug)]
pub struct Vertex {
    id: VertexId,
    neighbours: Vec<HalfEdge>,
    state: Mutex<VertexState>,
}

impl Vertex {
    pub(crate) fn new(id: VertexId) -> Self {
        Vertex {
            id,
            neighbours: Vec::new(),
            state: Mutex::new(VertexState::default()),
        }
    }

    pub(crate) fn push_half_edge(&mut self, half: HalfEdge) {
        self.neighbours.push(half);
    }

    pub(crate) fn state_mut(&mut self) -> &mut VertexState {
        self.state.get_mut()
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Incident half-edges in insertion order.
    pub fn neighbours(&self) -> &[HalfEdge] {
        &self.neighbours
    }

    /// Lock the vertex's search state.
    pub fn lock(&self) -> MutexGuard<'_, VertexState> {
        self.state.lock()
    }
}
