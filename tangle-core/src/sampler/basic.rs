//! The basic single-toggle Metropolis sampler.

use rand::rngs::SmallRng;

use crate::graph::Digraph;
use crate::stats::EffectSet;

use super::{SweepOptions, SweepStats, draw_dyad, metropolis_accept, weighted_total};

/// Runs one sweep of `steps` single-arc proposals.
///
/// Each proposal toggles the drawn dyad: deletions are applied
/// tentatively so the change statistics are always evaluated as the
/// change of *adding* the arc to the reduced graph, then negated through
/// the sign term of the acceptance ratio. On rejection (and, when
/// `perform_move` is off, on acceptance too) the graph is restored, so
/// the net effect of a rejected proposal is the identity.
pub fn basic_sweep(
    g: &mut Digraph,
    effects: &EffectSet,
    theta: &[f64],
    steps: u64,
    opts: SweepOptions,
    rng: &mut SmallRng,
) -> SweepStats {
    debug_assert_eq!(theta.len(), effects.len());
    let mut stats = SweepStats::zeroed(effects.len());
    let mut deltas = vec![0.0; effects.len()];
    let mut accepted = 0u64;

    for _ in 0..steps {
        let (i, j, is_delete) = draw_dyad(g, opts, rng);
        if is_delete {
            g.remove_arc(i, j);
        }
        effects.change_statistics(g, i, j, &mut deltas);
        let sign = if is_delete { -1.0 } else { 1.0 };
        let total = weighted_total(theta, &deltas, sign);

        if metropolis_accept(total, rng) {
            accepted += 1;
            let accumulator = if is_delete {
                &mut stats.del_delta
            } else {
                &mut stats.add_delta
            };
            for (slot, delta) in accumulator.iter_mut().zip(&deltas) {
                *slot += *delta;
            }
            if is_delete {
                if !opts.perform_move {
                    g.insert_arc(i, j);
                }
            } else if opts.perform_move {
                g.insert_arc(i, j);
            }
        } else if is_delete {
            g.insert_arc(i, j);
        }
    }

    if steps > 0 {
        stats.acceptance_rate = accepted as f64 / steps as f64;
    }
    stats
}
