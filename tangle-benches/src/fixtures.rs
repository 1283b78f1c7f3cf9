//! Deterministic synthetic fixtures for benchmarks.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tangle_core::{AttributeStore, Digraph, EffectSet, EffectSpec};

/// Builds an Erdős–Rényi graph where each ordered dyad is an arc with
/// probability `p`, deterministically from `seed`.
#[must_use]
pub fn er_graph(n: u32, p: f64, seed: u64) -> Digraph {
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

/// Resolves a structural effect registry by name.
///
/// # Panics
/// Panics when a name is not in the catalog; benchmark fixtures are
/// static and must resolve.
#[must_use]
pub fn structural_effects(names: &[&str]) -> EffectSet {
    let specs: Vec<EffectSpec> = names
        .iter()
        .map(|&name| EffectSpec {
            name: name.to_owned(),
            args: Vec::new(),
        })
        .collect();
    match EffectSet::resolve(&specs, &[], &[], &[], 2.0, &AttributeStore::default()) {
        Ok(set) => set,
        Err(err) => panic!("benchmark effects must resolve: {err}"),
    }
}
