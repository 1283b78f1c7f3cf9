//! Attribute-indexed change statistics.
//!
//! Missing observations contribute zero (binary, continuous, set) or
//! never match (categorical), so partially observed columns degrade the
//! statistic instead of poisoning it.

use crate::graph::{Digraph, NodeId};

fn binary(g: &Digraph, v: NodeId, attr: usize) -> bool {
    g.attributes().binary(attr).get(v).unwrap_or(false)
}

fn continuous(g: &Digraph, v: NodeId, attr: usize) -> f64 {
    g.attributes().continuous(attr).get(v)
}

fn categories_match(g: &Digraph, i: NodeId, j: NodeId, attr: usize) -> bool {
    let column = g.attributes().categorical(attr);
    matches!((column.get(i), column.get(j)), (Some(a), Some(b)) if a == b)
}

pub(super) fn sender(g: &Digraph, i: NodeId, attr: usize) -> f64 {
    if binary(g, i, attr) { 1.0 } else { 0.0 }
}

pub(super) fn receiver(g: &Digraph, j: NodeId, attr: usize) -> f64 {
    if binary(g, j, attr) { 1.0 } else { 0.0 }
}

pub(super) fn interaction(g: &Digraph, i: NodeId, j: NodeId, attr: usize) -> f64 {
    if binary(g, i, attr) && binary(g, j, attr) {
        1.0
    } else {
        0.0
    }
}

pub(super) fn matching(g: &Digraph, i: NodeId, j: NodeId, attr: usize) -> f64 {
    if categories_match(g, i, j, attr) {
        1.0
    } else {
        0.0
    }
}

pub(super) fn matching_reciprocity(g: &Digraph, i: NodeId, j: NodeId, attr: usize) -> f64 {
    if categories_match(g, i, j, attr) && g.is_arc(j, i) {
        1.0
    } else {
        0.0
    }
}

pub(super) fn continuous_sender(g: &Digraph, i: NodeId, attr: usize) -> f64 {
    let x = continuous(g, i, attr);
    if x.is_nan() { 0.0 } else { x }
}

pub(super) fn continuous_receiver(g: &Digraph, j: NodeId, attr: usize) -> f64 {
    let x = continuous(g, j, attr);
    if x.is_nan() { 0.0 } else { x }
}

pub(super) fn diff(g: &Digraph, i: NodeId, j: NodeId, attr: usize) -> f64 {
    let (a, b) = (continuous(g, i, attr), continuous(g, j, attr));
    if a.is_nan() || b.is_nan() {
        0.0
    } else {
        (a - b).abs()
    }
}

pub(super) fn diff_reciprocity(g: &Digraph, i: NodeId, j: NodeId, attr: usize) -> f64 {
    if g.is_arc(j, i) { diff(g, i, j, attr) } else { 0.0 }
}

pub(super) fn jaccard_similarity(g: &Digraph, i: NodeId, j: NodeId, attr: usize) -> f64 {
    let column = g.attributes().set(attr);
    let (Some(a), Some(b)) = (column.get(i), column.get(j)) else {
        return 0.0;
    };
    let union = (a | b).count_ones();
    if union == 0 {
        0.0
    } else {
        f64::from((a & b).count_ones()) / f64::from(union)
    }
}

pub(super) fn matching_interaction(
    g: &Digraph,
    i: NodeId,
    j: NodeId,
    first: usize,
    second: usize,
) -> f64 {
    if categories_match(g, i, j, first) && categories_match(g, i, j, second) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BinaryColumn, CategoricalColumn, ContinuousColumn, SetColumn};
    use crate::test_utils::graph_from_arcs;

    fn attributed_graph() -> Digraph {
        let mut g = graph_from_arcs(4, &[(1, 0)]);
        g.attach_binary(BinaryColumn::new(
            "smoker",
            vec![Some(true), Some(true), Some(false), None],
        ));
        g.attach_categorical(CategoricalColumn::new(
            "region",
            vec![Some(7), Some(7), Some(2), None],
        ));
        g.attach_continuous(ContinuousColumn::new(
            "age",
            vec![30.0, 40.0, 25.0, f64::NAN],
        ));
        g.attach_set(SetColumn::new(
            "skills",
            vec![Some(0b0111), Some(0b0110), Some(0), None],
        ));
        g
    }

    #[test]
    fn binary_effects_treat_missing_as_false() {
        let g = attributed_graph();
        assert_eq!(sender(&g, 0, 0), 1.0);
        assert_eq!(sender(&g, 3, 0), 0.0);
        assert_eq!(interaction(&g, 0, 1, 0), 1.0);
        assert_eq!(interaction(&g, 0, 2, 0), 0.0);
    }

    #[test]
    fn matching_requires_both_observed() {
        let g = attributed_graph();
        assert_eq!(matching(&g, 0, 1, 0), 1.0);
        assert_eq!(matching(&g, 0, 2, 0), 0.0);
        assert_eq!(matching(&g, 0, 3, 0), 0.0);
        assert_eq!(matching_reciprocity(&g, 0, 1, 0), 1.0);
        assert_eq!(matching_reciprocity(&g, 1, 0, 0), 0.0);
    }

    #[test]
    fn continuous_effects_zero_out_missing() {
        let g = attributed_graph();
        assert_eq!(continuous_sender(&g, 1, 0), 40.0);
        assert_eq!(continuous_receiver(&g, 3, 0), 0.0);
        assert_eq!(diff(&g, 0, 1, 0), 10.0);
        assert_eq!(diff(&g, 0, 3, 0), 0.0);
        assert_eq!(diff_reciprocity(&g, 0, 1, 0), 10.0);
        assert_eq!(diff_reciprocity(&g, 1, 2, 0), 0.0);
    }

    #[test]
    fn jaccard_ratio_of_overlap_to_union() {
        let g = attributed_graph();
        assert!((jaccard_similarity(&g, 0, 1, 0) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(jaccard_similarity(&g, 0, 2, 0), 0.0);
        assert_eq!(jaccard_similarity(&g, 0, 3, 0), 0.0);
    }
}
