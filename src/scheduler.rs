//! Root scheduling and the worker loop.
//!
//! # Architecture
//!
//! Every vertex is seeded once into a FIFO queue of root candidates. Workers
//! pop candidates and try to claim them as tree roots under the
//! owner-or-vertex protocol:
//!
//! - already matched, or owned by an exhausted tree: discarded for good;
//!   a matched vertex never becomes exposed again, and an exhausted tree
//!   certifies no augmenting path from any of its vertices;
//! - owned by a growing tree or one mid-teardown: a transient conflict, the
//!   candidate is pushed back for a later attempt;
//! - free and unmatched: a new tree is rooted there and grown to completion.
//!
//! A tree that ends [`ApsOutcome::Abandoned`] lost a conflict rather than
//! proving anything, so its root is also requeued. The run terminates when
//! the queue is empty; each pop either retires a candidate permanently or
//! reflects another tree's forward progress.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;

use crate::aps::{self, ApsOutcome};
use crate::graph::{Colour, Graph, VertexId};
use crate::stats::Counter;
use crate::sync::{lock_owner_or_vertex, VertexClaim};
use crate::tree::{Tree, TreeStatus};

/// FIFO queue of root candidates, shared by all workers.
pub struct RootQueue {
    queue: Mutex<VecDeque<VertexId>>,
}

impl RootQueue {
    /// A queue seeded with every vertex of an `n`-vertex graph, in order.
    pub fn new(n: usize) -> Self {
        RootQueue {
            queue: Mutex::new((0..n).collect()),
        }
    }

    pub fn pop(&self) -> Option<VertexId> {
        self.queue.lock().pop_front()
    }

    pub fn push(&self, v: VertexId) {
        self.queue.lock().push_back(v);
    }
}

enum RootClaim {
    /// Rooted a new tree at the candidate.
    Started(Arc<Tree>),
    /// The candidate can never root a tree again.
    Discard,
    /// Transient owner; try again later.
    Retry,
}

fn try_start_tree(graph: &Graph, v: VertexId, worker: usize) -> RootClaim {
    match lock_owner_or_vertex(graph, v) {
        VertexClaim::Owned(guard) => {
            if guard.status() == TreeStatus::Exhausted {
                RootClaim::Discard
            } else {
                RootClaim::Retry
            }
        }
        VertexClaim::Free(mut state) => {
            // The vertex lock is held, so no incident edge can flip under
            // this coverage check.
            if graph.is_covered(v) {
                return RootClaim::Discard;
            }
            let tree = Tree::new(graph.allocate_tree_id(), v, worker);
            state.colour = Colour::Red;
            state.entry = None;
            state.tree = Some(Arc::clone(&tree));
            tree.lock().push_member(v);
            graph.stats().increment(Counter::TreesCreated);
            RootClaim::Started(tree)
        }
    }
}

fn worker_loop(graph: &Graph, roots: &RootQueue, worker: usize) {
    debug!("worker {worker}: started");
    while let Some(v) = roots.pop() {
        match try_start_tree(graph, v, worker) {
            RootClaim::Discard => {}
            RootClaim::Retry => {
                graph.stats().increment(Counter::RootRetries);
                roots.push(v);
                std::thread::yield_now();
            }
            RootClaim::Started(tree) => {
                debug!("worker {worker}: growing tree {} from root {v}", tree.id());
                if aps::grow(graph, &tree) == ApsOutcome::Abandoned {
                    roots.push(v);
                }
            }
        }
    }
    debug!("worker {worker}: queue empty, stopping");
}

/// Run the concurrent engine to completion with up to `threads` workers.
///
/// More workers than vertices buys nothing, so the count is clamped. The
/// matching is left in the graph store; read it with
/// [`Graph::matched_pairs`] or [`Graph::matching_size`].
pub fn find_matching(graph: &Graph, threads: usize) {
    let workers = threads.max(1).min(graph.vertex_count().max(1));
    let roots = RootQueue::new(graph.vertex_count());
    std::thread::scope(|scope| {
        for worker in 1..=workers {
            let roots = &roots;
            scope.spawn(move || worker_loop(graph, roots, worker));
        }
    });
    info!(
        "matched {} edges with {} workers ({} trees, {} conflicts)",
        graph.matching_size(),
        workers,
        graph.stats().get(Counter::TreesCreated),
        graph.stats().get(Counter::Conflicts)
    );
}
