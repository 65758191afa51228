//! Run counters.
//!
//! One atomic slot per [`Counter`] variant, owned by the graph store so a
//! run's diagnostics travel with the graph they describe. Counts are
//! advisory (relaxed ordering); they never influence control flow.

use std::sync::atomic::{AtomicU64, Ordering};

use strum::EnumCount;
use strum_macros::{EnumCount as EnumCountMacro, EnumIter};

/// Events counted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumCountMacro, EnumIter)]
pub enum Counter {
    /// Trees started from a claimed free root.
    TreesCreated,
    /// Two growing trees met at an edge.
    Conflicts,
    /// Augmenting paths applied to the matching.
    AugmentingPaths,
    /// Trees that ended exhausted (membership retained).
    ExhaustedTrees,
    /// Roots pushed back because their claim hit a transient owner.
    RootRetries,
}

/// Thread-safe counter array, indexed by [`Counter`].
#[derive(Debug, Default)]
pub struct Statistics {
    counts: [AtomicU64; Counter::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    pub fn increment(&self, counter: Counter) {
        self.counts[counter as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counts[counter as usize].load(Ordering::Relaxed)
    }
}
