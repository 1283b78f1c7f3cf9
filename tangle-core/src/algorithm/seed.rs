//! The seed phase: θ and step-scale calibration from a fixed baseline.

use std::io::{self, Write};

use rand::rngs::SmallRng;
use tracing::debug;

use crate::graph::Digraph;
use crate::stats::EffectSet;

use super::{SamplerSettings, StatStream, arc_column, run_sweep};

/// Controls for the seed phase.
#[derive(Clone, Copy, Debug)]
pub struct SeedParams {
    /// Number of calibration sweeps (M₁).
    pub iterations: u64,
    /// Step multiplier for the θ nudges.
    pub aca_s: f64,
}

/// Result of the seed phase: a starting point and per-effect step scales
/// for the equilibrium phase.
#[derive(Clone, Debug)]
pub struct SeedEstimate {
    /// Seed parameter vector.
    pub theta: Vec<f64>,
    /// Per-effect step scale, m over the accumulated squared drift.
    pub d_mean: Vec<f64>,
}

/// Runs the seed phase.
///
/// Every sweep samples against the unchanged observed graph (no move is
/// kept), so the accumulated squared drift of each statistic approximates
/// the curvature the equilibrium phase needs as a step scale. θ itself is
/// nudged towards shrinking the drift, damped by the squared total
/// activity of the effect so busy statistics do not run away.
///
/// Emits one θ-stream row per sweep with `t` counting up to -1, so the
/// phase boundary is visible in pooled output.
///
/// # Errors
/// Propagates θ-stream write failures.
pub fn seed_phase<W: Write>(
    g: &mut Digraph,
    effects: &EffectSet,
    params: &SeedParams,
    settings: &SamplerSettings,
    ifd_aux: &mut f64,
    rng: &mut SmallRng,
    theta_stream: &mut StatStream<W>,
) -> io::Result<SeedEstimate> {
    let p = effects.len();
    let mut theta = vec![0.0; p];
    let mut d0 = vec![0.0; p];

    for t in 0..params.iterations {
        let (stats, _) = run_sweep(g, effects, &theta, settings, false, ifd_aux, rng);
        for k in 0..p {
            let drift = stats.del_delta[k] - stats.add_delta[k];
            let activity = stats.del_delta[k] + stats.add_delta[k];
            d0[k] += drift * drift;
            if activity != 0.0 {
                let damping = params.aca_s / (activity * activity);
                theta[k] += drift.signum() * damping * drift * drift;
            }
        }
        theta_stream.row(
            t as i64 - params.iterations as i64,
            arc_column(settings, g, *ifd_aux),
            &theta,
            Some(stats.acceptance_rate),
        )?;
    }
    theta_stream.flush()?;

    let d_mean: Vec<f64> = d0
        .iter()
        .map(|&d| if d > 0.0 { settings.steps as f64 / d } else { 0.0 })
        .collect();
    debug!(?theta, ?d_mean, "seed phase finished");
    Ok(SeedEstimate { theta, d_mean })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectSpec;
    use crate::graph::AttributeStore;
    use crate::test_utils::{er_graph, graph_from_arcs};

    use rand::SeedableRng;

    fn effects(names: &[&str]) -> EffectSet {
        let specs: Vec<EffectSpec> = names
            .iter()
            .map(|&n| EffectSpec {
                name: n.to_owned(),
                args: Vec::new(),
            })
            .collect();
        EffectSet::resolve(&specs, &[], &[], &[], 2.0, &AttributeStore::default())
            .unwrap_or_else(|err| panic!("effects must resolve: {err}"))
    }

    const SETTINGS: SamplerSettings = SamplerSettings {
        steps: 100,
        use_ifd: false,
        conditional: false,
        forbid_reciprocity: false,
        ifd_k: 0.1,
    };

    fn run(
        g: &mut Digraph,
        set: &EffectSet,
        iterations: u64,
        seed: u64,
    ) -> (SeedEstimate, Vec<u8>) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut stream = StatStream::new(Vec::new());
        let mut aux = 0.0;
        let params = SeedParams {
            iterations,
            aca_s: 1.0,
        };
        let estimate = seed_phase(g, set, &params, &SETTINGS, &mut aux, &mut rng, &mut stream)
            .unwrap_or_else(|err| panic!("vec stream cannot fail: {err}"));
        (estimate, stream.into_inner())
    }

    #[test]
    fn observed_graph_survives_the_phase_untouched() {
        let mut g = graph_from_arcs(4, &[]);
        let set = effects(&["Arc"]);
        let (estimate, _) = run(&mut g, &set, 10, 99);
        assert_eq!(g.arc_count(), 0);
        assert!(estimate.theta[0].is_finite());
        assert!(estimate.d_mean[0] > 0.0);
    }

    #[test]
    fn emitted_t_counts_up_to_minus_one() {
        let mut g = er_graph(10, 0.2, 17);
        let set = effects(&["Arc"]);
        let (_, bytes) = run(&mut g, &set, 5, 3);
        let text = String::from_utf8(bytes).unwrap_or_else(|err| panic!("stream utf-8: {err}"));
        let ts: Vec<i64> = text
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .next()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or_else(|| panic!("malformed row {line}"))
            })
            .collect();
        assert_eq!(ts, [-5, -4, -3, -2, -1]);
    }

    #[test]
    fn idle_effects_get_a_zero_step_scale() {
        // On an empty graph nothing ever completes a mutual dyad, so the
        // reciprocity statistic never moves and its scale stays frozen.
        let mut g = graph_from_arcs(5, &[]);
        let set = effects(&["Arc", "Reciprocity"]);
        let (estimate, _) = run(&mut g, &set, 8, 12);
        assert_eq!(estimate.theta[1], 0.0);
        assert_eq!(estimate.d_mean[1], 0.0);
        assert!(estimate.d_mean[0] > 0.0);
    }

    #[test]
    fn fixed_seed_reproduces_the_stream_byte_for_byte() {
        let set = effects(&["Arc", "Reciprocity"]);
        let mut g1 = er_graph(12, 0.15, 7);
        let mut g2 = er_graph(12, 0.15, 7);
        let (e1, bytes1) = run(&mut g1, &set, 12, 1234);
        let (e2, bytes2) = run(&mut g2, &set, 12, 1234);
        assert_eq!(bytes1, bytes2);
        assert_eq!(e1.theta, e2.theta);
        assert_eq!(e1.d_mean, e2.d_mean);
    }
}
