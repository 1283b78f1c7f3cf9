//! Directed graph store with incrementally maintained two-path tables.
//!
//! The estimator toggles single arcs millions of times per run, so every
//! query a change statistic makes must be cheap: `is_arc` is O(1),
//! neighbour lists are slices, and the two ordered-pair tables (directed
//! two-paths and shared out-targets) are repaired in O(degree) on each
//! toggle instead of being recomputed. Arcs are additionally kept in a
//! dense list so a uniformly random existing arc can be drawn in O(1).

mod attributes;
mod snowball;
mod two_paths;

pub use attributes::{
    AttributeStore, BinaryColumn, CategoricalColumn, ContinuousColumn, SetColumn,
};
pub use snowball::Snowball;

use hashbrown::HashMap;

use two_paths::PairCounts;

/// Node identifier; nodes are numbered `0..n`.
pub type NodeId = u32;

/// A directed graph over nodes `0..n` with per-node attributes and
/// optional snowball zones.
///
/// Invariants, restored by every mutation:
/// - no self-loops, no duplicate arcs;
/// - `out_neighbours`/`in_neighbours` mirror the arc list exactly;
/// - `two_paths(i, j)` equals the number of k with i -> k -> j;
/// - `mixed_paths(i, j)` equals the number of k with i -> k <- j;
/// - when zones are attached, `prev_wave_degree` matches the arc set.
#[derive(Clone, Debug)]
pub struct Digraph {
    n: u32,
    out_neighbours: Vec<Vec<NodeId>>,
    in_neighbours: Vec<Vec<NodeId>>,
    arc_list: Vec<(NodeId, NodeId)>,
    arc_index: HashMap<(NodeId, NodeId), usize>,
    two_paths: PairCounts,
    mixed_paths: PairCounts,
    attributes: AttributeStore,
    snowball: Option<Snowball>,
}

impl Digraph {
    /// Creates an empty graph on `n` nodes.
    #[must_use]
    pub fn new(n: u32) -> Self {
        Self {
            n,
            out_neighbours: vec![Vec::new(); n as usize],
            in_neighbours: vec![Vec::new(); n as usize],
            arc_list: Vec::new(),
            arc_index: HashMap::new(),
            two_paths: PairCounts::default(),
            mixed_paths: PairCounts::default(),
            attributes: AttributeStore::default(),
            snowball: None,
        }
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Returns the number of arcs.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.arc_list.len()
    }

    /// Returns the number of ordered dyads, n(n-1).
    #[must_use]
    pub fn dyad_count(&self) -> u64 {
        u64::from(self.n) * u64::from(self.n.saturating_sub(1))
    }

    /// Returns whether the arc i -> j is present.
    #[must_use]
    pub fn is_arc(&self, i: NodeId, j: NodeId) -> bool {
        self.arc_index.contains_key(&(i, j))
    }

    /// Returns whether i and j are adjacent in either direction.
    #[must_use]
    pub fn is_arc_ignore_dir(&self, i: NodeId, j: NodeId) -> bool {
        self.is_arc(i, j) || self.is_arc(j, i)
    }

    /// Returns the out-neighbours of `v`.
    #[must_use]
    pub fn out_neighbours(&self, v: NodeId) -> &[NodeId] {
        &self.out_neighbours[v as usize]
    }

    /// Returns the in-neighbours of `v`.
    #[must_use]
    pub fn in_neighbours(&self, v: NodeId) -> &[NodeId] {
        &self.in_neighbours[v as usize]
    }

    /// Returns the out-degree of `v`.
    #[must_use]
    pub fn out_degree(&self, v: NodeId) -> u32 {
        self.out_neighbours[v as usize].len() as u32
    }

    /// Returns the in-degree of `v`.
    #[must_use]
    pub fn in_degree(&self, v: NodeId) -> u32 {
        self.in_neighbours[v as usize].len() as u32
    }

    /// Returns all arcs in insertion order (perturbed by removals).
    #[must_use]
    pub fn arcs(&self) -> &[(NodeId, NodeId)] {
        &self.arc_list
    }

    /// Returns the arc at `index` in the dense arc list.
    #[must_use]
    pub fn arc_at(&self, index: usize) -> (NodeId, NodeId) {
        self.arc_list[index]
    }

    /// Returns the number of directed two-paths i -> k -> j.
    #[must_use]
    pub fn two_paths(&self, i: NodeId, j: NodeId) -> u32 {
        self.two_paths.get(i, j)
    }

    /// Returns the number of shared out-targets k with i -> k and j -> k.
    #[must_use]
    pub fn mixed_paths(&self, i: NodeId, j: NodeId) -> u32 {
        let (a, b) = if i <= j { (i, j) } else { (j, i) };
        self.mixed_paths.get(a, b)
    }

    /// Inserts the arc i -> j.
    ///
    /// The caller guarantees i != j and that the arc is absent; both are
    /// checked in debug builds only.
    pub fn insert_arc(&mut self, i: NodeId, j: NodeId) {
        debug_assert_ne!(i, j, "self-loop {i} -> {j}");
        debug_assert!(!self.is_arc(i, j), "duplicate arc {i} -> {j}");

        if let Some(snowball) = self.snowball.as_mut() {
            if !self.arc_index.contains_key(&(j, i)) {
                snowball.adjacency_created(i, j);
            }
        }

        // Enumerate before touching adjacency so the new arc never pairs
        // with itself.
        for &k in &self.out_neighbours[j as usize] {
            if k != i {
                self.two_paths.increment(i, k);
            }
        }
        for &k in &self.in_neighbours[i as usize] {
            if k != j {
                self.two_paths.increment(k, j);
            }
        }
        for &b in &self.in_neighbours[j as usize] {
            let (lo, hi) = if i <= b { (i, b) } else { (b, i) };
            self.mixed_paths.increment(lo, hi);
        }

        self.out_neighbours[i as usize].push(j);
        self.in_neighbours[j as usize].push(i);
        self.arc_index.insert((i, j), self.arc_list.len());
        self.arc_list.push((i, j));
    }

    /// Removes the arc i -> j.
    ///
    /// The caller guarantees the arc is present; checked in debug builds
    /// only.
    pub fn remove_arc(&mut self, i: NodeId, j: NodeId) {
        debug_assert!(self.is_arc(i, j), "removal of absent arc {i} -> {j}");

        let Some(list_index) = self.arc_index.remove(&(i, j)) else {
            return;
        };
        self.arc_list.swap_remove(list_index);
        if let Some(&moved) = self.arc_list.get(list_index) {
            self.arc_index.insert(moved, list_index);
        }
        detach(&mut self.out_neighbours[i as usize], j);
        detach(&mut self.in_neighbours[j as usize], i);

        for &k in &self.out_neighbours[j as usize] {
            if k != i {
                self.two_paths.decrement(i, k);
            }
        }
        for &k in &self.in_neighbours[i as usize] {
            if k != j {
                self.two_paths.decrement(k, j);
            }
        }
        for &b in &self.in_neighbours[j as usize] {
            let (lo, hi) = if i <= b { (i, b) } else { (b, i) };
            self.mixed_paths.decrement(lo, hi);
        }

        if let Some(snowball) = self.snowball.as_mut() {
            if !self.arc_index.contains_key(&(j, i)) {
                snowball.adjacency_severed(i, j);
            }
        }
    }

    /// Returns `ln(L / (N - L))` where L is the arc count and N the
    /// number of ordered dyads.
    ///
    /// Meaningful only for 0 < L < N; the boundary densities produce an
    /// infinite correction.
    #[must_use]
    pub fn arc_correction(&self) -> f64 {
        let arcs = self.arc_count() as f64;
        let dyads = self.dyad_count() as f64;
        (arcs / (dyads - arcs)).ln()
    }

    /// Returns the attribute columns attached to this graph.
    #[must_use]
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Attaches a binary column; the caller has validated the row count.
    pub fn attach_binary(&mut self, column: BinaryColumn) {
        debug_assert_eq!(column.len(), self.n as usize);
        self.attributes.push_binary(column);
    }

    /// Attaches a categorical column; the caller has validated the row count.
    pub fn attach_categorical(&mut self, column: CategoricalColumn) {
        debug_assert_eq!(column.len(), self.n as usize);
        self.attributes.push_categorical(column);
    }

    /// Attaches a continuous column; the caller has validated the row count.
    pub fn attach_continuous(&mut self, column: ContinuousColumn) {
        debug_assert_eq!(column.len(), self.n as usize);
        self.attributes.push_continuous(column);
    }

    /// Attaches a set column; the caller has validated the row count.
    pub fn attach_set(&mut self, column: SetColumn) {
        debug_assert_eq!(column.len(), self.n as usize);
        self.attributes.push_set(column);
    }

    /// Attaches snowball zones and recomputes every preceding-wave degree
    /// from the current arc set.
    pub fn attach_zones(&mut self, zones: Vec<u32>) {
        debug_assert_eq!(zones.len(), self.n as usize);
        let mut snowball = Snowball::new(zones);
        for &(a, b) in &self.arc_list {
            // Count each undirected adjacency once even when reciprocated.
            if !self.arc_index.contains_key(&(b, a)) || a < b {
                snowball.adjacency_created(a, b);
            }
        }
        self.snowball = Some(snowball);
    }

    /// Returns the snowball structure, if zones are attached.
    #[must_use]
    pub fn snowball(&self) -> Option<&Snowball> {
        self.snowball.as_ref()
    }
}

fn detach(neighbours: &mut Vec<NodeId>, v: NodeId) {
    if let Some(pos) = neighbours.iter().position(|&u| u == v) {
        neighbours.swap_remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{brute_force_mixed_paths, brute_force_two_paths, graph_from_arcs};

    use proptest::prelude::*;
    use rand::{Rng, SeedableRng, rngs::SmallRng};
    use rstest::rstest;

    #[test]
    fn toggles_keep_adjacency_and_arc_list_in_step() {
        let mut g = graph_from_arcs(4, &[(0, 1), (1, 2), (2, 0), (0, 3)]);
        assert_eq!(g.arc_count(), 4);
        assert!(g.is_arc(2, 0));
        assert!(g.is_arc_ignore_dir(0, 2));
        assert!(!g.is_arc(0, 2));

        // Removing a non-terminal arc exercises the swap-remove fixup.
        g.remove_arc(0, 1);
        assert_eq!(g.arc_count(), 3);
        assert!(!g.is_arc(0, 1));
        for idx in 0..g.arc_count() {
            let (a, b) = g.arc_at(idx);
            assert!(g.is_arc(a, b));
        }
        assert_eq!(g.out_degree(0), 1);
        assert_eq!(g.in_degree(1), 0);
    }

    #[rstest]
    #[case(&[(0, 1), (1, 2)], 0, 2, 1)]
    #[case(&[(0, 1), (1, 2), (0, 3), (3, 2)], 0, 2, 2)]
    #[case(&[(0, 1), (1, 0)], 0, 0, 0)]
    fn two_path_counts_match_definition(
        #[case] arcs: &[(NodeId, NodeId)],
        #[case] i: NodeId,
        #[case] j: NodeId,
        #[case] expected: u32,
    ) {
        let g = graph_from_arcs(4, arcs);
        assert_eq!(g.two_paths(i, j), expected);
    }

    #[test]
    fn mixed_path_counts_are_symmetric() {
        let g = graph_from_arcs(4, &[(0, 2), (1, 2), (0, 3), (1, 3)]);
        assert_eq!(g.mixed_paths(0, 1), 2);
        assert_eq!(g.mixed_paths(1, 0), 2);
        assert_eq!(g.mixed_paths(2, 3), 0);
    }

    #[test]
    fn reciprocated_arc_does_not_count_as_two_path() {
        let mut g = graph_from_arcs(3, &[(0, 1), (1, 0)]);
        assert_eq!(g.two_paths(0, 0), 0);
        assert_eq!(g.two_paths(1, 1), 0);
        g.remove_arc(1, 0);
        assert_eq!(g.two_paths(0, 1), 0);
    }

    #[test]
    fn arc_correction_matches_density_logit() {
        let g = graph_from_arcs(4, &[(0, 1), (1, 2), (2, 3)]);
        let expected = (3.0_f64 / (12.0 - 3.0)).ln();
        assert!((g.arc_correction() - expected).abs() < 1e-12);
    }

    #[test]
    fn attach_zones_counts_each_undirected_adjacency_once() {
        let mut g = graph_from_arcs(4, &[(0, 1), (1, 0), (1, 2), (2, 3)]);
        g.attach_zones(vec![0, 1, 2, 2]);
        let snowball = g.snowball().map(Clone::clone).unwrap();
        assert_eq!(snowball.prev_wave_degree(1), 1);
        assert_eq!(snowball.prev_wave_degree(2), 1);
        assert_eq!(snowball.prev_wave_degree(3), 0);
    }

    #[test]
    fn snowball_degrees_follow_toggles() {
        let mut g = graph_from_arcs(3, &[(0, 1)]);
        g.attach_zones(vec![0, 1, 1]);
        g.insert_arc(1, 0);
        // Second arc on the same dyad must not double-count the adjacency.
        assert_eq!(g.snowball().map(|s| s.prev_wave_degree(1)), Some(1));
        g.remove_arc(0, 1);
        assert_eq!(g.snowball().map(|s| s.prev_wave_degree(1)), Some(1));
        g.remove_arc(1, 0);
        assert_eq!(g.snowball().map(|s| s.prev_wave_degree(1)), Some(0));
    }

    proptest! {
        // Random toggle sequences must leave the incremental tables equal
        // to a from-scratch recount.
        #[test]
        fn tables_survive_random_toggle_sequences(seed in any::<u64>()) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let n: u32 = rng.gen_range(3..9);
            let mut g = Digraph::new(n);
            for _ in 0..120 {
                let i = rng.gen_range(0..n);
                let j = rng.gen_range(0..n);
                if i == j {
                    continue;
                }
                if g.is_arc(i, j) {
                    g.remove_arc(i, j);
                } else {
                    g.insert_arc(i, j);
                }
            }
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    prop_assert_eq!(g.two_paths(i, j), brute_force_two_paths(&g, i, j));
                    prop_assert_eq!(g.mixed_paths(i, j), brute_force_mixed_paths(&g, i, j));
                }
            }
        }
    }
}
