//! The improved fixed-density (IFD) sampler.
//!
//! Every iteration pairs an add proposal at a random empty dyad with a
//! delete proposal at a random existing arc. The Arc effect is excluded
//! from the model; its role in the acceptance ratio is played by the
//! auxiliary parameter, which the estimator retunes between sweeps from
//! the signed arc-count drift reported here.

use rand::{Rng, rngs::SmallRng};

use crate::graph::Digraph;
use crate::stats::EffectSet;

use super::{SweepOptions, SweepStats, metropolis_accept, weighted_total};

/// Outcome of one fixed-density sweep.
#[derive(Clone, Debug)]
pub struct IfdSweep {
    /// Accepted change statistics and acceptance rate.
    pub stats: SweepStats,
    /// Accepted deletes minus accepted adds: the arc-count deficit the
    /// auxiliary parameter must correct.
    pub dz_arc: f64,
}

/// Runs one sweep of `steps` paired add/delete proposals.
///
/// `aux` stands in for the Arc effect's parameter: it enters each add
/// ratio with positive sign and each delete ratio with negative sign.
/// On a degenerate graph (empty or complete) the impossible half of the
/// pair is skipped and counted as a rejection.
pub fn ifd_sweep(
    g: &mut Digraph,
    effects: &EffectSet,
    theta: &[f64],
    aux: f64,
    steps: u64,
    opts: SweepOptions,
    rng: &mut SmallRng,
) -> IfdSweep {
    debug_assert_eq!(theta.len(), effects.len());
    let mut stats = SweepStats::zeroed(effects.len());
    let mut deltas = vec![0.0; effects.len()];
    let mut accepted = 0u64;
    let mut dz_arc = 0.0;

    for _ in 0..steps {
        if (g.arc_count() as u64) < g.dyad_count() {
            let (i, j) = draw_empty_dyad(g, opts.forbid_reciprocity, rng);
            effects.change_statistics(g, i, j, &mut deltas);
            let total = aux + weighted_total(theta, &deltas, 1.0);
            if metropolis_accept(total, rng) {
                accepted += 1;
                dz_arc -= 1.0;
                for (slot, delta) in stats.add_delta.iter_mut().zip(&deltas) {
                    *slot += *delta;
                }
                if opts.perform_move {
                    g.insert_arc(i, j);
                }
            }
        }

        if g.arc_count() > 0 {
            let (i, j) = g.arc_at(rng.gen_range(0..g.arc_count()));
            g.remove_arc(i, j);
            effects.change_statistics(g, i, j, &mut deltas);
            let total = -aux + weighted_total(theta, &deltas, -1.0);
            if metropolis_accept(total, rng) {
                accepted += 1;
                dz_arc += 1.0;
                for (slot, delta) in stats.del_delta.iter_mut().zip(&deltas) {
                    *slot += *delta;
                }
                if !opts.perform_move {
                    g.insert_arc(i, j);
                }
            } else {
                g.insert_arc(i, j);
            }
        }
    }

    if steps > 0 {
        stats.acceptance_rate = accepted as f64 / (2 * steps) as f64;
    }
    IfdSweep { stats, dz_arc }
}

fn draw_empty_dyad(g: &Digraph, forbid_reciprocity: bool, rng: &mut SmallRng) -> (u32, u32) {
    loop {
        let i = rng.gen_range(0..g.n());
        let j = rng.gen_range(0..g.n());
        if i == j || g.is_arc(i, j) {
            continue;
        }
        if forbid_reciprocity && g.is_arc(j, i) {
            continue;
        }
        return (i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectSpec;
    use crate::graph::{AttributeStore, Digraph};
    use crate::test_utils::er_graph;

    use rand::SeedableRng;

    fn reciprocity_only() -> EffectSet {
        let specs = [EffectSpec {
            name: "Reciprocity".to_owned(),
            args: Vec::new(),
        }];
        EffectSet::resolve(&specs, &[], &[], &[], 2.0, &AttributeStore::default())
            .unwrap_or_else(|err| panic!("effects must resolve: {err}"))
    }

    const MOVES: SweepOptions = SweepOptions {
        perform_move: true,
        conditional: false,
        forbid_reciprocity: false,
    };

    #[test]
    fn zero_parameters_conserve_the_arc_count_exactly() {
        // With θ = 0 and aux = 0 both halves of every pair accept, so the
        // count returns to its starting value after each iteration.
        let mut g = er_graph(16, 0.15, 12);
        let initial = g.arc_count();
        let set = reciprocity_only();
        let mut rng = SmallRng::seed_from_u64(3);
        let sweep = ifd_sweep(&mut g, &set, &[0.0], 0.0, 400, MOVES, &mut rng);
        assert_eq!(g.arc_count(), initial);
        assert_eq!(sweep.dz_arc, 0.0);
        assert_eq!(sweep.stats.acceptance_rate, 1.0);
    }

    #[test]
    fn drift_matches_the_arc_count_change() {
        let mut g = er_graph(16, 0.2, 31);
        let initial = g.arc_count() as f64;
        let set = reciprocity_only();
        let mut rng = SmallRng::seed_from_u64(9);
        // A skewed auxiliary makes adds likelier than deletes.
        let sweep = ifd_sweep(&mut g, &set, &[0.0], 1.5, 300, MOVES, &mut rng);
        assert_eq!(sweep.dz_arc, initial - g.arc_count() as f64);
    }

    #[test]
    fn frozen_sweeps_report_drift_without_mutating() {
        let mut g = er_graph(12, 0.2, 5);
        let arcs_before = g.arcs().len();
        let set = reciprocity_only();
        let mut rng = SmallRng::seed_from_u64(27);
        let opts = SweepOptions {
            perform_move: false,
            ..MOVES
        };
        let sweep = ifd_sweep(&mut g, &set, &[0.0], 0.4, 250, opts, &mut rng);
        assert_eq!(g.arcs().len(), arcs_before);
        assert!(sweep.stats.acceptance_rate > 0.5);
    }

    #[test]
    fn empty_graph_skips_the_delete_half() {
        let mut g = Digraph::new(6);
        let set = reciprocity_only();
        let mut rng = SmallRng::seed_from_u64(1);
        let opts = SweepOptions {
            perform_move: false,
            ..MOVES
        };
        let sweep = ifd_sweep(&mut g, &set, &[0.0], 0.0, 50, opts, &mut rng);
        // Only the add half can ever fire, and it always accepts.
        assert_eq!(sweep.stats.acceptance_rate, 0.5);
        assert_eq!(sweep.dz_arc, -50.0);
        assert_eq!(g.arc_count(), 0);
    }

    #[test]
    fn reciprocity_ban_applies_to_the_add_half() {
        let mut g = Digraph::new(8);
        let set = reciprocity_only();
        let mut rng = SmallRng::seed_from_u64(41);
        ifd_sweep(&mut g, &set, &[0.0], 0.5, 600, SweepOptions {
            forbid_reciprocity: true,
            ..MOVES
        }, &mut rng);
        for &(i, j) in g.arcs() {
            assert!(!g.is_arc(j, i), "mutual dyad {i} <-> {j}");
        }
    }
}
