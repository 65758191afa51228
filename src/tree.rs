//! Alternating trees and the tree lock.
//!
//! # Architecture
//!
//! A tree bundles the state one augmenting-path search grows: its status,
//! conflict flags, root, and member list. All of it is guarded by a single
//! logical *tree lock* that other workers can wait on: releasing the lock
//! broadcasts to every waiter, which is what makes the owner-or-vertex
//! protocol in [`crate::sync`] free of lost wakeups.
//!
//! The lock is a monitor: a `held` flag inside a mutex, plus a condvar
//! signalled on release. [`TreeGuard`] owns the logical lock; dropping it
//! clears the flag and notifies. Guard methods take the inner mutex only for
//! the duration of one field access, so holding a `TreeGuard` never blocks
//! anyone who merely wants to *try* the lock and give up.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::graph::VertexId;

/// Lifecycle of a tree.
///
/// `Growing` is the only state in which the tree claims vertices. It leaves
/// `Growing` exactly once, under the tree lock, to one of the two terminal
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeStatus {
    /// The owning worker is still extending the frontier.
    Growing,
    /// Done (path applied, or abandoned after losing a conflict); members
    /// are about to be released.
    Free,
    /// Fully explored with no augmenting path; members stay claimed for the
    /// rest of the run.
    Exhausted,
}

#[derive(Debug)]
struct TreeShared {
    held: bool,
    status: TreeStatus,
    /// Set when this tree initiated a conflict against a differently
    /// coloured vertex of another growing tree.
    loser: bool,
    /// Set once an augmenting path through this tree has been applied.
    had_path: bool,
    members: Vec<VertexId>,
}

/// One alternating tree. Shared between its owning worker and any vertex
/// state that points back at it.
#[derive(Debug)]
pub struct Tree {
    id: u64,
    root: VertexId,
    /// Worker that grows this tree, for log correlation.
    owner: usize,
    shared: Mutex<TreeShared>,
    released: Condvar,
}

impl Tree {
    pub fn new(id: u64, root: VertexId, owner: usize) -> Arc<Self> {
        Arc::new(Tree {
            id,
            root,
            owner,
            shared: Mutex::new(TreeShared {
                held: false,
                status: TreeStatus::Growing,
                loser: false,
                had_path: false,
                members: Vec::new(),
            }),
            released: Condvar::new(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn root(&self) -> VertexId {
        self.root
    }

    pub fn owner(&self) -> usize {
        self.owner
    }

    /// Take the tree lock if it is not held.
    pub fn try_lock(self: &Arc<Self>) -> Option<TreeGuard> {
        let mut shared = self.shared.lock();
        if shared.held {
            None
        } else {
            shared.held = true;
            Some(TreeGuard {
                tree: Arc::clone(self),
            })
        }
    }

    /// Take the tree lock, waiting for releases as needed.
    pub fn lock(self: &Arc<Self>) -> TreeGuard {
        loop {
            if let Some(guard) = self.try_lock() {
                return guard;
            }
            self.wait_released();
        }
    }

    /// Block until the tree lock is released (or return immediately if it is
    /// not held). Callers re-check their condition afterwards; spurious
    /// returns are fine.
    pub fn wait_released(&self) {
        let mut shared = self.shared.lock();
        if shared.held {
            self.released.wait(&mut shared);
        }
    }
}

/// Holder of a tree's logical lock. Dropping it releases the lock and wakes
/// every waiter.
#[derive(Debug)]
pub struct TreeGuard {
    tree: Arc<Tree>,
}

impl TreeGuard {
    pub fn tree(&self) -> &Arc<Tree> {
        &self.tree
    }

    pub fn id(&self) -> u64 {
        self.tree.id
    }

    pub fn root(&self) -> VertexId {
        self.tree.root
    }

    pub fn status(&self) -> TreeStatus {
        self.tree.shared.lock().status
    }

    pub fn set_status(&self, status: TreeStatus) {
        self.tree.shared.lock().status = status;
    }

    pub fn loser(&self) -> bool {
        self.tree.shared.lock().loser
    }

    pub fn set_loser(&self) {
        self.tree.shared.lock().loser = true;
    }

    pub fn had_path(&self) -> bool {
        self.tree.shared.lock().had_path
    }

    pub fn set_had_path(&self) {
        self.tree.shared.lock().had_path = true;
    }

    /// Record a newly claimed member.
    pub fn push_member(&self, v: VertexId) {
        self.tree.shared.lock().members.push(v);
    }

    /// Drain the member list for release.
    pub fn take_members(&self) -> Vec<VertexId> {
        std::mem::take(&mut self.tree.shared.lock().members)
    }
}

impl Drop for TreeGuard {
    fn drop(&mut self) {
        let mut shared = self.tree.shared.lock();
        shared.held = false;
        self.tree.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_try_lock_is_exclusive() {
        let tree = Tree::new(0, 5, 1);
        let guard = tree.try_lock().unwrap();
        assert!(tree.try_lock().is_none());
        drop(guard);
        assert!(tree.try_lock().is_some());
    }

    #[test]
    fn test_new_tree_is_growing_with_root() {
        let tree = Tree::new(7, 3, 2);
        let guard = tree.lock();
        assert_eq!(guard.status(), TreeStatus::Growing);
        assert!(!guard.loser());
        assert!(!guard.had_path());
        assert_eq!(guard.root(), 3);
        assert_eq!(tree.owner(), 2);
    }

    #[test]
    fn test_release_wakes_waiter() {
        let tree = Tree::new(1, 0, 1);
        let guard = tree.lock();
        std::thread::scope(|scope| {
            let waiter = scope.spawn(|| {
                tree.wait_released();
                tree.try_lock().is_some()
            });
            // Give the waiter time to block before releasing.
            std::thread::sleep(Duration::from_millis(20));
            drop(guard);
            assert!(waiter.join().unwrap());
        });
    }

    #[test]
    fn test_wait_released_returns_when_unheld() {
        let tree = Tree::new(2, 0, 1);
        tree.wait_released(); // must not block
    }

    #[test]
    fn test_members_drain_once() {
        let tree = Tree::new(3, 0, 1);
        let guard = tree.lock();
        guard.push_member(0);
        guard.push_member(4);
        assert_eq!(guard.take_members(), vec![0, 4]);
        assert!(guard.take_members().is_empty());
    }
}
