//! Structural change statistics.
//!
//! Each function returns the change its statistic undergoes when the arc
//! i -> j is added to the graph as passed in. Degree- and star-based
//! deltas read the endpoint degrees directly; triangle- and path-based
//! deltas combine the maintained two-path tables with one O(degree)
//! neighbour scan. The alternating statistics share the geometric decay
//! λ, with q = 1 - 1/λ.

use crate::graph::{Digraph, NodeId};

fn indicator(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}

fn geometric(q: f64, count: u32) -> f64 {
    q.powi(count as i32)
}

pub(super) fn arc() -> f64 {
    1.0
}

pub(super) fn reciprocity(g: &Digraph, i: NodeId, j: NodeId) -> f64 {
    indicator(g.is_arc(j, i))
}

/// Change in the number of sinks (in-degree > 0, out-degree 0).
pub(super) fn sink(g: &Digraph, i: NodeId, j: NodeId) -> f64 {
    let mut delta = 0.0;
    if g.out_degree(i) == 0 && g.in_degree(i) > 0 {
        delta -= 1.0;
    }
    if g.out_degree(j) == 0 && g.in_degree(j) == 0 {
        delta += 1.0;
    }
    delta
}

/// Change in the number of sources (out-degree > 0, in-degree 0).
pub(super) fn source(g: &Digraph, i: NodeId, j: NodeId) -> f64 {
    let mut delta = 0.0;
    if g.in_degree(j) == 0 && g.out_degree(j) > 0 {
        delta -= 1.0;
    }
    if g.in_degree(i) == 0 && g.out_degree(i) == 0 {
        delta += 1.0;
    }
    delta
}

pub(super) fn isolates(g: &Digraph, i: NodeId, j: NodeId) -> f64 {
    let isolated = |v: NodeId| g.in_degree(v) == 0 && g.out_degree(v) == 0;
    -(indicator(isolated(i)) + indicator(isolated(j)))
}

pub(super) fn in_two_stars(g: &Digraph, j: NodeId) -> f64 {
    f64::from(g.in_degree(j))
}

pub(super) fn out_two_stars(g: &Digraph, i: NodeId) -> f64 {
    f64::from(g.out_degree(i))
}

/// Change in the number of directed paths a -> b -> c with a != c.
pub(super) fn two_paths(g: &Digraph, i: NodeId, j: NodeId) -> f64 {
    f64::from(g.in_degree(i) + g.out_degree(j)) - 2.0 * indicator(g.is_arc(j, i))
}

/// Change in the number of transitive triads: the new arc can close a
/// two-path as the shortcut, serve as the first leg, or serve as the
/// second leg.
pub(super) fn transitive_triangles(g: &Digraph, i: NodeId, j: NodeId) -> f64 {
    let as_shortcut = g.two_paths(i, j);
    let as_first_leg = g.mixed_paths(i, j);
    let as_second_leg = g
        .in_neighbours(i)
        .iter()
        .filter(|&&k| g.is_arc(k, j))
        .count() as u32;
    f64::from(as_shortcut + as_first_leg + as_second_leg)
}

pub(super) fn cyclic_triangles(g: &Digraph, i: NodeId, j: NodeId) -> f64 {
    f64::from(g.two_paths(j, i))
}

pub(super) fn alt_in_stars(g: &Digraph, j: NodeId, decay: f64) -> f64 {
    let q = 1.0 - 1.0 / decay;
    geometric(q, g.in_degree(j))
}

pub(super) fn alt_out_stars(g: &Digraph, i: NodeId, decay: f64) -> f64 {
    let q = 1.0 - 1.0 / decay;
    geometric(q, g.out_degree(i))
}

/// Change in the alternating transitive k-triangle statistic
/// λ Σ_{(u,v) ∈ arcs} (1 - q^{two_paths(u, v)}).
///
/// The new arc contributes its own term, and lengthens the two-path count
/// of every existing arc it completes a two-path for: arcs (k, j) with
/// k -> i, and arcs (i, k) with j -> k.
pub(super) fn alt_k_triangles_t(g: &Digraph, i: NodeId, j: NodeId, decay: f64) -> f64 {
    let q = 1.0 - 1.0 / decay;
    let mut delta = decay * (1.0 - geometric(q, g.two_paths(i, j)));
    for &k in g.in_neighbours(i) {
        if g.is_arc(k, j) {
            delta += geometric(q, g.two_paths(k, j));
        }
    }
    for &k in g.out_neighbours(j) {
        if g.is_arc(i, k) {
            delta += geometric(q, g.two_paths(i, k));
        }
    }
    delta
}

/// Change in the alternating two-path statistic
/// λ Σ_{ordered pairs u != v} (1 - q^{two_paths(u, v)}).
pub(super) fn alt_two_paths_t(g: &Digraph, i: NodeId, j: NodeId, decay: f64) -> f64 {
    let q = 1.0 - 1.0 / decay;
    let mut delta = 0.0;
    for &k in g.in_neighbours(i) {
        if k != j {
            delta += geometric(q, g.two_paths(k, j));
        }
    }
    for &k in g.out_neighbours(j) {
        if k != i {
            delta += geometric(q, g.two_paths(i, k));
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::graph_from_arcs;

    use rstest::rstest;

    #[test]
    fn sink_gains_when_target_was_isolated() {
        let g = graph_from_arcs(3, &[(2, 0)]);
        // 0 is currently a sink; adding 0 -> 1 un-sinks 0 and sinks 1.
        assert_eq!(sink(&g, 0, 1), 0.0);
        // Adding 2 -> 1 sinks 1 without touching 2.
        assert_eq!(sink(&g, 2, 1), 1.0);
    }

    #[test]
    fn source_mirrors_sink() {
        let g = graph_from_arcs(3, &[(0, 2)]);
        assert_eq!(source(&g, 1, 0), 0.0);
        assert_eq!(source(&g, 1, 2), 1.0);
    }

    #[test]
    fn isolates_only_ever_decreases() {
        let g = graph_from_arcs(3, &[(0, 1)]);
        assert_eq!(isolates(&g, 0, 2), -1.0);
        assert_eq!(isolates(&g, 0, 1), 0.0);
        let empty = graph_from_arcs(3, &[]);
        assert_eq!(isolates(&empty, 1, 2), -2.0);
    }

    #[rstest]
    #[case(&[], 0.0)]
    #[case(&[(2, 0), (1, 3)], 2.0)]
    #[case(&[(2, 0), (1, 0), (1, 3), (1, 2)], 3.0)]
    fn two_paths_counts_new_paths_through_the_arc(
        #[case] arcs: &[(NodeId, NodeId)],
        #[case] expected: f64,
    ) {
        let g = graph_from_arcs(4, arcs);
        assert_eq!(two_paths(&g, 0, 1), expected);
    }

    #[test]
    fn two_paths_excludes_loops_over_a_mutual_dyad() {
        let g = graph_from_arcs(3, &[(1, 0)]);
        // in(0) = {1} and out(1) = {0}: both candidate paths are loops.
        assert_eq!(two_paths(&g, 0, 1), 0.0);
    }

    #[test]
    fn transitive_triangles_counts_all_three_roles() {
        // 0 -> 2 -> 1 (shortcut role), 0 -> 3 and 1 -> 3 (first leg),
        // 4 -> 0 and 4 -> 1 (second leg).
        let g = graph_from_arcs(5, &[(0, 2), (2, 1), (0, 3), (1, 3), (4, 0), (4, 1)]);
        assert_eq!(transitive_triangles(&g, 0, 1), 3.0);
    }

    #[test]
    fn cyclic_triangles_use_the_reverse_two_path() {
        let g = graph_from_arcs(3, &[(1, 2), (2, 0)]);
        assert_eq!(cyclic_triangles(&g, 0, 1), 1.0);
        assert_eq!(transitive_triangles(&g, 0, 1), 0.0);
    }

    #[test]
    fn alternating_stars_decay_geometrically() {
        let g = graph_from_arcs(4, &[(1, 0), (2, 0)]);
        assert_eq!(alt_in_stars(&g, 0, 2.0), 0.25);
        assert_eq!(alt_in_stars(&g, 3, 2.0), 1.0);
        assert_eq!(alt_out_stars(&g, 1, 2.0), 0.5);
    }

    #[test]
    fn alt_k_triangles_new_arc_term_vanishes_without_two_paths() {
        let g = graph_from_arcs(4, &[]);
        assert_eq!(alt_k_triangles_t(&g, 0, 1, 2.0), 0.0);
    }

    #[test]
    fn alt_k_triangles_counts_closed_and_lengthened_arcs() {
        // Adding 0 -> 1: own term from path 0 -> 2 -> 1, plus arc (3, 1)
        // gains the two-path 3 -> 0 -> 1.
        let g = graph_from_arcs(4, &[(0, 2), (2, 1), (3, 0), (3, 1)]);
        let delta = alt_k_triangles_t(&g, 0, 1, 2.0);
        let expected = 2.0 * (1.0 - 0.5) + 1.0;
        assert!((delta - expected).abs() < 1e-12);
    }
}
