//! Shared fixtures for unit and property tests.

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::graph::{Digraph, NodeId};

/// Builds a graph on `n` nodes from an explicit arc list.
pub(crate) fn graph_from_arcs(n: u32, arcs: &[(NodeId, NodeId)]) -> Digraph {
    let mut g = Digraph::new(n);
    for &(i, j) in arcs {
        g.insert_arc(i, j);
    }
    g
}

/// Builds an Erdős–Rényi graph where each ordered dyad is an arc with
/// probability `p`, deterministically from `seed`.
pub(crate) fn er_graph(n: u32, p: f64, seed: u64) -> Digraph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut g = Digraph::new(n);
    for i in 0..n {
        for j in 0..n {
            if i != j && rng.gen_bool(p) {
                g.insert_arc(i, j);
            }
        }
    }
    g
}

/// Counts directed two-paths i -> k -> j by full enumeration.
pub(crate) fn brute_force_two_paths(g: &Digraph, i: NodeId, j: NodeId) -> u32 {
    (0..g.n())
        .filter(|&k| k != i && k != j && g.is_arc(i, k) && g.is_arc(k, j))
        .count() as u32
}

/// Counts shared out-targets k with i -> k and j -> k by full enumeration.
pub(crate) fn brute_force_mixed_paths(g: &Digraph, i: NodeId, j: NodeId) -> u32 {
    (0..g.n())
        .filter(|&k| k != i && k != j && g.is_arc(i, k) && g.is_arc(j, k))
        .count() as u32
}
