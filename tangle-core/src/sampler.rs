//! Metropolis toggle samplers over directed graphs.
//!
//! A sweep issues a fixed number of single-arc proposals against the
//! current graph, accepting each with probability `exp(θ · s · Δ)` and
//! accumulating the change statistics of accepted adds and deletes
//! separately. Two variants exist: the basic sampler toggles one dyad per
//! proposal, and the fixed-density sampler pairs an add with a delete so
//! the arc count stays pinned to the observed network.

mod basic;
mod ifd;

pub use basic::basic_sweep;
pub use ifd::{IfdSweep, ifd_sweep};

use rand::{Rng, distributions::Standard, rngs::SmallRng};

use crate::graph::{Digraph, NodeId};

/// Options governing one sweep.
#[derive(Clone, Copy, Debug)]
pub struct SweepOptions {
    /// Keep accepted toggles. When false the graph is restored after
    /// every proposal and only the accumulators advance.
    pub perform_move: bool,
    /// Restrict proposals to the snowball-conditional dyad set.
    pub conditional: bool,
    /// Redraw add proposals that would close a mutual dyad.
    pub forbid_reciprocity: bool,
}

/// Accepted change statistics accumulated over one sweep.
#[derive(Clone, Debug)]
pub struct SweepStats {
    /// Accepted proposals over proposals issued.
    pub acceptance_rate: f64,
    /// Per-effect sums of change statistics of accepted adds.
    pub add_delta: Vec<f64>,
    /// Per-effect sums of change statistics of accepted deletes.
    pub del_delta: Vec<f64>,
}

impl SweepStats {
    pub(crate) fn zeroed(effects: usize) -> Self {
        Self {
            acceptance_rate: 0.0,
            add_delta: vec![0.0; effects],
            del_delta: vec![0.0; effects],
        }
    }
}

/// Metropolis test: accept with probability `exp(total)`.
///
/// The exponential is taken in double precision with no clamping; a
/// non-finite ratio rejects the proposal outright so an overflowing
/// linear predictor cannot corrupt the chain.
pub(crate) fn metropolis_accept(total: f64, rng: &mut SmallRng) -> bool {
    let ratio = total.exp();
    if !ratio.is_finite() {
        return false;
    }
    let draw: f64 = rng.sample(Standard);
    draw < ratio
}

pub(crate) fn weighted_total(theta: &[f64], deltas: &[f64], sign: f64) -> f64 {
    theta
        .iter()
        .zip(deltas)
        .map(|(t, d)| t * sign * d)
        .sum()
}

/// Draws a dyad for the basic sampler, honouring the configured
/// constraints, and reports whether toggling it is a deletion.
pub(crate) fn draw_dyad(
    g: &Digraph,
    opts: SweepOptions,
    rng: &mut SmallRng,
) -> (NodeId, NodeId, bool) {
    if opts.conditional {
        draw_conditional(g, rng)
    } else {
        draw_unconditional(g, opts.forbid_reciprocity, rng)
    }
}

fn draw_unconditional(g: &Digraph, forbid_reciprocity: bool, rng: &mut SmallRng) -> (NodeId, NodeId, bool) {
    loop {
        let i = rng.gen_range(0..g.n());
        let j = rng.gen_range(0..g.n());
        if i == j {
            continue;
        }
        let is_delete = g.is_arc(i, j);
        if forbid_reciprocity && !is_delete && g.is_arc(j, i) {
            continue;
        }
        return (i, j, is_delete);
    }
}

/// Snowball-conditional selection: both endpoints inside the sample,
/// waves at most one apart, and never a deletion that would cut a node's
/// last tie to the wave that recruited it.
fn draw_conditional(g: &Digraph, rng: &mut SmallRng) -> (NodeId, NodeId, bool) {
    let Some(snowball) = g.snowball() else {
        debug_assert!(false, "conditional draw without attached zones");
        return draw_unconditional(g, false, rng);
    };
    let inner = snowball.inner_nodes();
    loop {
        let i = inner[rng.gen_range(0..inner.len())];
        let j = inner[rng.gen_range(0..inner.len())];
        if i == j {
            continue;
        }
        let (zi, zj) = (snowball.zone(i), snowball.zone(j));
        if zi.abs_diff(zj) > 1 {
            continue;
        }
        let is_delete = g.is_arc(i, j);
        if is_delete && !g.is_arc(j, i) {
            // Deleting the only arc of the dyad severs the adjacency.
            if zi + 1 == zj && snowball.prev_wave_degree(j) == 1 {
                continue;
            }
            if zj + 1 == zi && snowball.prev_wave_degree(i) == 1 {
                continue;
            }
        }
        return (i, j, is_delete);
    }
}
