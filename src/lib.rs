//! Maximum matching in bipartite graphs via concurrent augmenting-path
//! search.
//!
//! # Architecture
//!
//! Workers grow alternating trees from exposed roots in parallel, each tree
//! hunting for an augmenting path. The crate is layered bottom-up:
//!
//! - [`graph`]: the shared store: immutable topology, atomic matched bits
//!   (one per undirected edge, shared by both directions), per-vertex
//!   search state behind per-vertex locks.
//! - [`tree`]: the alternating tree and its lock, a monitor whose release
//!   broadcast lets waiters re-examine a vertex whose owner changed.
//! - [`sync`]: the owner-or-vertex protocols that acquire "whatever
//!   currently owns this vertex" without deadlocking.
//! - [`aps`]: the search engine: frontier growth, conflict resolution
//!   between trees (merge into one augmenting path, or mark the initiator a
//!   loser), path application, membership release.
//! - [`scheduler`]: the root queue, the worker loop, and
//!   [`find_matching`], the entry point that spawns and joins workers.
//! - [`sequential`]: a single-threaded reference engine, also usable as a
//!   maximality oracle.
//! - [`io`], [`error`], [`stats`]: the text format, the error taxonomy, and
//!   run counters.
//!
//! ```
//! use parmatch::{find_matching, Graph};
//!
//! let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
//! find_matching(&graph, 2);
//! assert_eq!(graph.matching_size(), 2);
//! ```

pub mod aps;
pub mod error;
pub mod graph;
pub mod io;
pub mod scheduler;
pub mod sequential;
pub mod stats;
pub mod sync;
pub mod tree;

pub use error::{Error, Result};
pub use graph::Graph;
pub use scheduler::find_matching;
