//! Parameter-estimation algorithms.
//!
//! Estimation runs in two phases over the same sampler. The seed phase
//! starts from θ = 0, never keeps a move, and calibrates a per-effect
//! step scale from the squared statistic drift. The equilibrium phase
//! then walks the graph, accumulating the signed drift and nudging θ
//! against it until the simulated statistics hover around the observed
//! ones. Both phases emit their trajectory through [`StatStream`] rows
//! that downstream tooling pools across tasks.

mod equilibrium;
mod seed;

pub use equilibrium::{EquilibriumParams, equilibrium_phase};
pub use seed::{SeedEstimate, SeedParams, seed_phase};

use std::io::{self, Write};

use rand::rngs::SmallRng;

use crate::graph::Digraph;
use crate::sampler::{SweepOptions, SweepStats, basic_sweep, ifd_sweep};
use crate::stats::EffectSet;

/// Sampler configuration shared by both phases of a task.
#[derive(Clone, Copy, Debug)]
pub struct SamplerSettings {
    /// Proposals per sweep (m).
    pub steps: u64,
    /// Use the fixed-density sampler instead of the basic one.
    pub use_ifd: bool,
    /// Snowball-conditional proposal set.
    pub conditional: bool,
    /// Redraw add proposals that would close a mutual dyad.
    pub forbid_reciprocity: bool,
    /// Step scale for the fixed-density auxiliary parameter.
    pub ifd_k: f64,
}

/// Runs one sweep with the configured sampler and, in fixed-density
/// mode, retunes the auxiliary parameter from the sweep's arc drift.
fn run_sweep(
    g: &mut Digraph,
    effects: &EffectSet,
    theta: &[f64],
    settings: &SamplerSettings,
    perform_move: bool,
    ifd_aux: &mut f64,
    rng: &mut SmallRng,
) -> (SweepStats, f64) {
    let opts = SweepOptions {
        perform_move,
        conditional: settings.conditional,
        forbid_reciprocity: settings.forbid_reciprocity,
    };
    if settings.use_ifd {
        let sweep = ifd_sweep(g, effects, theta, *ifd_aux, settings.steps, opts, rng);
        *ifd_aux += settings.ifd_k * sweep.dz_arc * sweep.dz_arc.abs();
        (sweep.stats, sweep.dz_arc)
    } else {
        let stats = basic_sweep(g, effects, theta, settings.steps, opts, rng);
        (stats, 0.0)
    }
}

/// The Arc-equivalent output column in fixed-density mode: the auxiliary
/// parameter corrected by the density logit of the current graph.
fn arc_column(settings: &SamplerSettings, g: &Digraph, ifd_aux: f64) -> Option<f64> {
    settings
        .use_ifd
        .then(|| ifd_aux - g.arc_correction())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; zero for windows shorter than two.
fn sample_sd(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (squares / (values.len() - 1) as f64).sqrt()
}

/// A whitespace-separated numeric output stream with one leading `t`
/// column, an optional Arc column, and an optional trailing acceptance
/// column.
#[derive(Debug)]
pub struct StatStream<W: Write> {
    writer: W,
}

impl<W: Write> StatStream<W> {
    /// Wraps a writer; callers hand in buffered file handles or, in
    /// tests, plain byte vectors.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the header row.
    ///
    /// # Errors
    /// Propagates any write failure.
    pub fn header<'a>(
        &mut self,
        arc_column: bool,
        names: impl Iterator<Item = &'a str>,
        acceptance: bool,
    ) -> io::Result<()> {
        write!(self.writer, "t")?;
        if arc_column {
            write!(self.writer, " Arc")?;
        }
        for name in names {
            write!(self.writer, " {name}")?;
        }
        if acceptance {
            write!(self.writer, " AcceptanceRate")?;
        }
        writeln!(self.writer)
    }

    /// Writes one data row.
    ///
    /// # Errors
    /// Propagates any write failure.
    pub fn row(
        &mut self,
        t: i64,
        arc: Option<f64>,
        values: &[f64],
        acceptance: Option<f64>,
    ) -> io::Result<()> {
        write!(self.writer, "{t}")?;
        if let Some(arc) = arc {
            write!(self.writer, " {arc}")?;
        }
        for value in values {
            write!(self.writer, " {value}")?;
        }
        if let Some(rate) = acceptance {
            write!(self.writer, " {rate}")?;
        }
        writeln!(self.writer)
    }

    /// Flushes the underlying writer.
    ///
    /// # Errors
    /// Propagates any flush failure.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consumes the stream, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
