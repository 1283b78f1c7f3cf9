//! The equilibrium phase: drift-driven θ updates with adaptive scaling.

use std::io::{self, Write};

use rand::rngs::SmallRng;
use tracing::debug;

use crate::graph::Digraph;
use crate::stats::EffectSet;

use super::{SamplerSettings, SeedEstimate, StatStream, arc_column, mean, run_sweep, sample_sd};

/// Controls for the equilibrium phase.
#[derive(Clone, Copy, Debug)]
pub struct EquilibriumParams {
    /// Outer iterations; step scales are retuned and streams flushed once
    /// per outer pass.
    pub outer_iterations: u64,
    /// Inner iterations per outer pass.
    pub inner_iterations: u64,
    /// Step multiplier for the θ updates.
    pub aca_ee: f64,
    /// Target coefficient of variation for θ within an inner window.
    pub comp_c: f64,
    /// Floor applied to |mean θ| before computing the variation.
    pub mean_floor: f64,
    /// Ignore windows whose θ standard deviation is below this.
    pub sd_threshold: f64,
    /// Emit a row every inner iteration instead of once per outer pass.
    pub output_all_steps: bool,
}

/// Runs the equilibrium phase and returns the final parameter vector.
///
/// Every sweep now keeps its accepted moves, so the graph walks the model
/// distribution while `dzA` accumulates how far the simulated statistics
/// have drifted from the observed ones. θ moves against the accumulated
/// drift, scaled per effect by the seed phase's step scale, which is
/// itself rescaled after each inner window to hold the coefficient of
/// variation of θ near `comp_c`.
///
/// # Errors
/// Propagates output-stream write failures.
#[expect(clippy::too_many_arguments, reason = "one call site, the task driver")]
pub fn equilibrium_phase<W1: Write, W2: Write>(
    g: &mut Digraph,
    effects: &EffectSet,
    seed: SeedEstimate,
    params: &EquilibriumParams,
    settings: &SamplerSettings,
    ifd_aux: &mut f64,
    rng: &mut SmallRng,
    theta_stream: &mut StatStream<W1>,
    dza_stream: &mut StatStream<W2>,
) -> io::Result<Vec<f64>> {
    let p = effects.len();
    let inner = params.inner_iterations as usize;
    let SeedEstimate {
        mut theta,
        d_mean: mut d0,
    } = seed;
    let mut dza = vec![0.0; p];
    let mut dz_arc_total = 0.0;
    let mut window = vec![0.0; p * inner];
    let mut t: i64 = 0;

    for _ in 0..params.outer_iterations {
        for inner_index in 0..inner {
            let (stats, dz_arc) = run_sweep(g, effects, &theta, settings, true, ifd_aux, rng);
            dz_arc_total += dz_arc;
            for k in 0..p {
                dza[k] += stats.add_delta[k] - stats.del_delta[k];
                let step = d0[k] * params.aca_ee;
                theta[k] -= dza[k].signum() * step * dza[k] * dza[k];
                window[k * inner + inner_index] = theta[k];
            }
            if params.output_all_steps || inner_index == 0 {
                theta_stream.row(
                    t,
                    arc_column(settings, g, *ifd_aux),
                    &theta,
                    Some(stats.acceptance_rate),
                )?;
                dza_stream.row(
                    t,
                    settings.use_ifd.then_some(dz_arc_total),
                    &dza,
                    None,
                )?;
            }
            t += 1;
        }

        for k in 0..p {
            let values = &window[k * inner..(k + 1) * inner];
            let mu = mean(values);
            let sigma = sample_sd(values, mu);
            let mu_abs = mu.abs().max(params.mean_floor);
            if sigma > params.sd_threshold {
                d0[k] *= (params.comp_c / (sigma / mu_abs)).sqrt();
            }
        }
        theta_stream.flush()?;
        dza_stream.flush()?;
    }

    debug!(?theta, "equilibrium phase finished");
    Ok(theta)
}
