//! Sparse ordered-pair counters backing the two-path tables.
//!
//! The graph maintains one table for directed two-paths (i -> k -> j) and
//! one for shared out-targets (i -> k <- j). Entries are dropped as soon
//! as they hit zero so the tables stay proportional to the number of
//! pairs actually connected by a two-path, not to n^2.

use hashbrown::HashMap;

use super::NodeId;

/// Counts over ordered node pairs, absent entries reading as zero.
#[derive(Clone, Debug, Default)]
pub(crate) struct PairCounts {
    counts: HashMap<(NodeId, NodeId), u32>,
}

impl PairCounts {
    pub(crate) fn get(&self, i: NodeId, j: NodeId) -> u32 {
        self.counts.get(&(i, j)).copied().unwrap_or(0)
    }

    pub(crate) fn increment(&mut self, i: NodeId, j: NodeId) {
        *self.counts.entry((i, j)).or_insert(0) += 1;
    }

    /// Decrements the pair, removing the entry when it reaches zero.
    ///
    /// The caller guarantees the count is positive; the tables are only
    /// ever decremented while undoing increments made for the same arc.
    pub(crate) fn decrement(&mut self, i: NodeId, j: NodeId) {
        if let Some(count) = self.counts.get_mut(&(i, j)) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&(i, j));
            }
        } else {
            debug_assert!(false, "decrement of absent pair ({i}, {j})");
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }
}
