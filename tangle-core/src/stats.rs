//! Change-statistic catalog and registry.
//!
//! Every effect in a model is one entry in a flat, indexed catalog. An
//! entry evaluates the change a single arc addition i -> j makes to its
//! sufficient statistic on the current graph; deletion deltas are
//! obtained by removing the arc first and negating the result, which the
//! samplers do. Effect order is fixed when the registry is resolved and
//! shared by the parameter vector, the output headers, and every
//! accumulator downstream.

mod attribute;
mod dyadic;
mod structural;

use crate::{
    config::EffectSpec,
    error::ConfigError,
    graph::{AttributeStore, Digraph, NodeId},
};

/// The four effect families, in registry order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EffectKind {
    /// Purely structural statistics.
    Struct,
    /// Statistics indexed by one nodal attribute column.
    Attr,
    /// Statistics over a dyadic covariate built from two columns.
    Dyadic,
    /// Statistics over a pair of attribute columns.
    AttrInteraction,
}

/// Resolved evaluation rule for one effect.
#[derive(Clone, Debug)]
enum EffectFn {
    Arc,
    Reciprocity,
    Sink,
    Source,
    Isolates,
    InTwoStars,
    OutTwoStars,
    TwoPaths,
    TransitiveTriangles,
    CyclicTriangles,
    AltInStars,
    AltOutStars,
    AltKTrianglesT,
    AltTwoPathsT,
    Sender { attr: usize },
    Receiver { attr: usize },
    Interaction { attr: usize },
    Matching { attr: usize },
    MatchingReciprocity { attr: usize },
    ContinuousSender { attr: usize },
    ContinuousReceiver { attr: usize },
    Diff { attr: usize },
    DiffReciprocity { attr: usize },
    JaccardSimilarity { attr: usize },
    GeoDistance { lat: usize, lon: usize },
    EuclideanDistance { x: usize, y: usize },
    MatchingInteraction { first: usize, second: usize },
}

/// One resolved effect: display name, family, and evaluation rule.
#[derive(Clone, Debug)]
pub struct Effect {
    name: String,
    kind: EffectKind,
    func: EffectFn,
}

impl Effect {
    /// Returns the effect's display name as used in output headers.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the effect's family.
    #[must_use]
    pub fn kind(&self) -> EffectKind {
        self.kind
    }
}

/// The resolved, ordered effect registry for one estimation task.
#[derive(Clone, Debug)]
pub struct EffectSet {
    effects: Vec<Effect>,
    decay: f64,
}

impl EffectSet {
    /// Resolves the configured effect lists against the attribute store.
    ///
    /// Registry order is the configured order within each list, lists in
    /// the order structural, attribute, dyadic, attribute-interaction.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for unknown effect names, wrong argument
    /// counts, or attribute references that do not match a loaded column.
    pub fn resolve(
        structural: &[EffectSpec],
        attr: &[EffectSpec],
        dyadic: &[EffectSpec],
        attr_interaction: &[EffectSpec],
        decay: f64,
        attributes: &AttributeStore,
    ) -> Result<Self, ConfigError> {
        let mut effects = Vec::with_capacity(
            structural.len() + attr.len() + dyadic.len() + attr_interaction.len(),
        );
        for spec in structural {
            effects.push(resolve_structural(spec)?);
        }
        for spec in attr {
            effects.push(resolve_attr(spec, attributes)?);
        }
        for spec in dyadic {
            effects.push(resolve_dyadic(spec, attributes)?);
        }
        for spec in attr_interaction {
            effects.push(resolve_attr_interaction(spec, attributes)?);
        }
        Ok(Self { effects, decay })
    }

    /// Returns the number of effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Returns the effect at registry index `k`.
    #[must_use]
    pub fn effect(&self, k: usize) -> &Effect {
        &self.effects[k]
    }

    /// Iterates display names in registry order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().map(Effect::name)
    }

    /// Returns the alternating-statistic decay λ.
    #[must_use]
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Evaluates every change statistic for adding arc i -> j to `g`,
    /// writing into `out` (length must equal [`Self::len`]).
    pub fn change_statistics(&self, g: &Digraph, i: NodeId, j: NodeId, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.effects.len());
        for (slot, effect) in out.iter_mut().zip(&self.effects) {
            *slot = self.evaluate(&effect.func, g, i, j);
        }
    }

    fn evaluate(&self, func: &EffectFn, g: &Digraph, i: NodeId, j: NodeId) -> f64 {
        match *func {
            EffectFn::Arc => structural::arc(),
            EffectFn::Reciprocity => structural::reciprocity(g, i, j),
            EffectFn::Sink => structural::sink(g, i, j),
            EffectFn::Source => structural::source(g, i, j),
            EffectFn::Isolates => structural::isolates(g, i, j),
            EffectFn::InTwoStars => structural::in_two_stars(g, j),
            EffectFn::OutTwoStars => structural::out_two_stars(g, i),
            EffectFn::TwoPaths => structural::two_paths(g, i, j),
            EffectFn::TransitiveTriangles => structural::transitive_triangles(g, i, j),
            EffectFn::CyclicTriangles => structural::cyclic_triangles(g, i, j),
            EffectFn::AltInStars => structural::alt_in_stars(g, j, self.decay),
            EffectFn::AltOutStars => structural::alt_out_stars(g, i, self.decay),
            EffectFn::AltKTrianglesT => structural::alt_k_triangles_t(g, i, j, self.decay),
            EffectFn::AltTwoPathsT => structural::alt_two_paths_t(g, i, j, self.decay),
            EffectFn::Sender { attr } => attribute::sender(g, i, attr),
            EffectFn::Receiver { attr } => attribute::receiver(g, j, attr),
            EffectFn::Interaction { attr } => attribute::interaction(g, i, j, attr),
            EffectFn::Matching { attr } => attribute::matching(g, i, j, attr),
            EffectFn::MatchingReciprocity { attr } => {
                attribute::matching_reciprocity(g, i, j, attr)
            }
            EffectFn::ContinuousSender { attr } => attribute::continuous_sender(g, i, attr),
            EffectFn::ContinuousReceiver { attr } => attribute::continuous_receiver(g, j, attr),
            EffectFn::Diff { attr } => attribute::diff(g, i, j, attr),
            EffectFn::DiffReciprocity { attr } => attribute::diff_reciprocity(g, i, j, attr),
            EffectFn::JaccardSimilarity { attr } => attribute::jaccard_similarity(g, i, j, attr),
            EffectFn::GeoDistance { lat, lon } => dyadic::geo_distance(g, i, j, lat, lon),
            EffectFn::EuclideanDistance { x, y } => dyadic::euclidean_distance(g, i, j, x, y),
            EffectFn::MatchingInteraction { first, second } => {
                attribute::matching_interaction(g, i, j, first, second)
            }
        }
    }
}

fn expect_args(spec: &EffectSpec, expected: usize) -> Result<(), ConfigError> {
    if spec.args.len() == expected {
        Ok(())
    } else {
        Err(ConfigError::EffectArity {
            effect: spec.name.clone(),
            expected,
            got: spec.args.len(),
        })
    }
}

fn resolve_structural(spec: &EffectSpec) -> Result<Effect, ConfigError> {
    let func = match spec.name.as_str() {
        "Arc" => EffectFn::Arc,
        "Reciprocity" => EffectFn::Reciprocity,
        "Sink" => EffectFn::Sink,
        "Source" => EffectFn::Source,
        "Isolates" => EffectFn::Isolates,
        "InTwoStars" => EffectFn::InTwoStars,
        "OutTwoStars" => EffectFn::OutTwoStars,
        "TwoPaths" => EffectFn::TwoPaths,
        "TransitiveTriangles" => EffectFn::TransitiveTriangles,
        "CyclicTriangles" => EffectFn::CyclicTriangles,
        "AltInStars" => EffectFn::AltInStars,
        "AltOutStars" => EffectFn::AltOutStars,
        "AltKTrianglesT" => EffectFn::AltKTrianglesT,
        "AltTwoPathsT" => EffectFn::AltTwoPathsT,
        _ => {
            return Err(ConfigError::UnknownEffect {
                name: spec.name.clone(),
                list: "structParams",
            });
        }
    };
    expect_args(spec, 0)?;
    Ok(Effect {
        name: spec.name.clone(),
        kind: EffectKind::Struct,
        func,
    })
}

fn resolve_attr(spec: &EffectSpec, attributes: &AttributeStore) -> Result<Effect, ConfigError> {
    expect_args(spec, 1)?;
    let column = spec.args[0].as_str();
    let unresolved = || ConfigError::UnresolvedAttribute {
        effect: spec.name.clone(),
        attribute: column.to_owned(),
    };
    let func = match spec.name.as_str() {
        "Sender" => EffectFn::Sender {
            attr: attributes.binary_index(column).ok_or_else(unresolved)?,
        },
        "Receiver" => EffectFn::Receiver {
            attr: attributes.binary_index(column).ok_or_else(unresolved)?,
        },
        "Interaction" => EffectFn::Interaction {
            attr: attributes.binary_index(column).ok_or_else(unresolved)?,
        },
        "Matching" => EffectFn::Matching {
            attr: attributes.categorical_index(column).ok_or_else(unresolved)?,
        },
        "MatchingReciprocity" => EffectFn::MatchingReciprocity {
            attr: attributes.categorical_index(column).ok_or_else(unresolved)?,
        },
        "ContinuousSender" => EffectFn::ContinuousSender {
            attr: attributes.continuous_index(column).ok_or_else(unresolved)?,
        },
        "ContinuousReceiver" => EffectFn::ContinuousReceiver {
            attr: attributes.continuous_index(column).ok_or_else(unresolved)?,
        },
        "Diff" => EffectFn::Diff {
            attr: attributes.continuous_index(column).ok_or_else(unresolved)?,
        },
        "DiffReciprocity" => EffectFn::DiffReciprocity {
            attr: attributes.continuous_index(column).ok_or_else(unresolved)?,
        },
        "JaccardSimilarity" => EffectFn::JaccardSimilarity {
            attr: attributes.set_index(column).ok_or_else(unresolved)?,
        },
        _ => {
            return Err(ConfigError::UnknownEffect {
                name: spec.name.clone(),
                list: "attrParams",
            });
        }
    };
    Ok(Effect {
        name: format!("{}_{column}", spec.name),
        kind: EffectKind::Attr,
        func,
    })
}

fn resolve_dyadic(spec: &EffectSpec, attributes: &AttributeStore) -> Result<Effect, ConfigError> {
    expect_args(spec, 2)?;
    let resolve_column = |column: &str| {
        attributes
            .continuous_index(column)
            .ok_or_else(|| ConfigError::UnresolvedAttribute {
                effect: spec.name.clone(),
                attribute: column.to_owned(),
            })
    };
    let first = resolve_column(spec.args[0].as_str())?;
    let second = resolve_column(spec.args[1].as_str())?;
    let func = match spec.name.as_str() {
        "GeoDistance" => EffectFn::GeoDistance {
            lat: first,
            lon: second,
        },
        "EuclideanDistance" => EffectFn::EuclideanDistance {
            x: first,
            y: second,
        },
        _ => {
            return Err(ConfigError::UnknownEffect {
                name: spec.name.clone(),
                list: "dyadicParams",
            });
        }
    };
    Ok(Effect {
        name: spec.name.clone(),
        kind: EffectKind::Dyadic,
        func,
    })
}

fn resolve_attr_interaction(
    spec: &EffectSpec,
    attributes: &AttributeStore,
) -> Result<Effect, ConfigError> {
    expect_args(spec, 2)?;
    let resolve_column = |column: &str| {
        attributes
            .categorical_index(column)
            .ok_or_else(|| ConfigError::UnresolvedAttribute {
                effect: spec.name.clone(),
                attribute: column.to_owned(),
            })
    };
    let func = match spec.name.as_str() {
        "MatchingInteraction" => EffectFn::MatchingInteraction {
            first: resolve_column(spec.args[0].as_str())?,
            second: resolve_column(spec.args[1].as_str())?,
        },
        _ => {
            return Err(ConfigError::UnknownEffect {
                name: spec.name.clone(),
                list: "attrInteractionParams",
            });
        }
    };
    Ok(Effect {
        name: format!("{}_{}_{}", spec.name, spec.args[0], spec.args[1]),
        kind: EffectKind::AttrInteraction,
        func,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::graph_from_arcs;

    fn spec(name: &str, args: &[&str]) -> EffectSpec {
        EffectSpec {
            name: name.to_owned(),
            args: args.iter().map(|&a| (*a).to_owned()).collect(),
        }
    }

    fn structural_set(names: &[&str]) -> EffectSet {
        let specs: Vec<EffectSpec> = names.iter().map(|&n| spec(n, &[])).collect();
        EffectSet::resolve(&specs, &[], &[], &[], 2.0, &AttributeStore::default())
            .unwrap_or_else(|err| panic!("effects must resolve: {err}"))
    }

    #[test]
    fn registry_order_is_struct_attr_dyadic_interaction() {
        let mut g = graph_from_arcs(3, &[]);
        g.attach_binary(crate::graph::BinaryColumn::new(
            "smoker",
            vec![Some(true), Some(false), None],
        ));
        g.attach_continuous(crate::graph::ContinuousColumn::new(
            "x",
            vec![0.0, 1.0, 2.0],
        ));
        g.attach_continuous(crate::graph::ContinuousColumn::new(
            "y",
            vec![0.0, 0.0, 0.0],
        ));
        g.attach_categorical(crate::graph::CategoricalColumn::new(
            "region",
            vec![Some(0), Some(0), Some(1)],
        ));
        g.attach_categorical(crate::graph::CategoricalColumn::new(
            "sector",
            vec![Some(2), Some(2), Some(2)],
        ));
        let set = EffectSet::resolve(
            &[spec("Arc", &[])],
            &[spec("Sender", &["smoker"])],
            &[spec("EuclideanDistance", &["x", "y"])],
            &[spec("MatchingInteraction", &["region", "sector"])],
            2.0,
            g.attributes(),
        )
        .unwrap_or_else(|err| panic!("effects must resolve: {err}"));
        let names: Vec<&str> = set.names().collect();
        assert_eq!(
            names,
            [
                "Arc",
                "Sender_smoker",
                "EuclideanDistance",
                "MatchingInteraction_region_sector",
            ]
        );
        assert_eq!(set.effect(1).kind(), EffectKind::Attr);
    }

    #[test]
    fn unknown_structural_effect_is_rejected() {
        let err = EffectSet::resolve(
            &[spec("Triangle", &[])],
            &[],
            &[],
            &[],
            2.0,
            &AttributeStore::default(),
        )
        .expect_err("unknown name must fail");
        assert!(matches!(err, ConfigError::UnknownEffect { list: "structParams", .. }));
    }

    #[test]
    fn attribute_binding_must_match_a_loaded_column() {
        let err = EffectSet::resolve(
            &[],
            &[spec("Sender", &["absent"])],
            &[],
            &[],
            2.0,
            &AttributeStore::default(),
        )
        .expect_err("missing column must fail");
        assert!(matches!(err, ConfigError::UnresolvedAttribute { .. }));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = EffectSet::resolve(
            &[spec("Reciprocity", &["extra"])],
            &[],
            &[],
            &[],
            2.0,
            &AttributeStore::default(),
        )
        .expect_err("arity must be checked");
        assert!(matches!(err, ConfigError::EffectArity { expected: 0, got: 1, .. }));
    }

    #[test]
    fn change_statistics_fill_in_registry_order() {
        let g = graph_from_arcs(3, &[(1, 0)]);
        let set = structural_set(&["Arc", "Reciprocity", "InTwoStars"]);
        let mut out = vec![0.0; set.len()];
        set.change_statistics(&g, 0, 1, &mut out);
        assert_eq!(out, [1.0, 1.0, 0.0]);
    }
}
