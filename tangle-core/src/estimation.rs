//! The estimation task driver.
//!
//! One task owns everything for one estimation run: the observed graph
//! and its attributes, the resolved effect registry, a task-seeded PRNG,
//! and the two output streams. `run` loads and validates every input
//! before any output file is created, runs the seed phase and then the
//! equilibrium phase, and optionally dumps the final simulated network.
//! Tasks share no state, so any number of them can run as parallel
//! processes and be pooled downstream.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use rand::{SeedableRng, rngs::SmallRng};
use tracing::info;

use crate::algorithm::{
    EquilibriumParams, SamplerSettings, SeedParams, StatStream, equilibrium_phase, seed_phase,
};
use crate::config::EstimConfig;
use crate::error::{ConfigError, EstimError, GraphError, Result};
use crate::graph::Digraph;
use crate::io::{
    read_binary_columns, read_categorical_columns, read_continuous_columns, read_pajek,
    read_set_columns, read_zones, write_pajek,
};
use crate::stats::EffectSet;

/// SplitMix64 increment (the 64-bit golden ratio) used for per-task seed
/// derivation.
const TASK_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

/// Derives an independent stream seed for `task` from the base seed.
#[inline]
#[must_use]
pub fn mix_task_seed(base_seed: u64, task: u32) -> u64 {
    splitmix64(base_seed ^ (u64::from(task) + 1).wrapping_mul(TASK_SEED_SPACING))
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(TASK_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

/// One estimation task: a configuration plus the task id that tags its
/// output files and decorrelates its PRNG stream.
#[derive(Clone, Debug)]
pub struct EstimationTask {
    config: EstimConfig,
    task_id: u32,
}

/// What a finished task reports back to its caller.
#[derive(Clone, Debug)]
pub struct TaskSummary {
    /// Effect names in registry order.
    pub effect_names: Vec<String>,
    /// Final parameter vector, same order as `effect_names`.
    pub theta: Vec<f64>,
    /// Nodes in the network.
    pub n: u32,
    /// Arcs in the final simulated network.
    pub arc_count: usize,
    /// Seed-phase sweep count (M₁).
    pub seed_iterations: u64,
}

impl EstimationTask {
    /// Pairs a parsed configuration with a task id.
    #[must_use]
    pub fn new(config: EstimConfig, task_id: u32) -> Self {
        Self { config, task_id }
    }

    /// Runs the task to completion.
    ///
    /// # Errors
    /// Returns [`EstimError`] for configuration, input, or output
    /// failures. Inputs are loaded and cross-validated before the first
    /// output file is created, so a rejected configuration leaves no
    /// partial output behind.
    pub fn run(self) -> Result<TaskSummary> {
        let Self { config, task_id } = self;
        config.validate()?;
        let arclist = config
            .arclist_file
            .as_ref()
            .ok_or(ConfigError::MissingKey { key: "arclistFile" })?;

        let mut g = read_pajek(arclist)?;
        attach_attributes(&mut g, &config)?;
        if config.use_conditional_estimation {
            attach_zones(&mut g, &config)?;
        }
        let effects = EffectSet::resolve(
            &config.struct_params,
            &config.attr_params,
            &config.dyadic_params,
            &config.attr_interaction_params,
            config.alternating_lambda,
            g.attributes(),
        )
        .map_err(EstimError::Config)?;

        if config.use_ifd_sampler
            && (g.arc_count() == 0 || g.arc_count() as u64 == g.dyad_count())
        {
            return Err(ConfigError::IncompatibleOptions {
                reason: "the IFD sampler requires an observed density strictly between \
                         empty and complete"
                    .to_owned(),
            }
            .into());
        }

        let base_seed = config.rng_seed.unwrap_or_else(rand::random);
        let mut rng = SmallRng::seed_from_u64(mix_task_seed(base_seed, task_id));

        let settings = SamplerSettings {
            steps: config.sampler_steps,
            use_ifd: config.use_ifd_sampler,
            conditional: config.use_conditional_estimation,
            forbid_reciprocity: config.forbid_reciprocity,
            ifd_k: config.ifd_k,
        };
        let seed_iterations = config.s_steps * u64::from(g.n()) / config.sampler_steps;
        let mut ifd_aux = if config.use_ifd_sampler {
            g.arc_correction()
        } else {
            0.0
        };

        info!(
            task = task_id,
            n = g.n(),
            arcs = g.arc_count(),
            effects = effects.len(),
            seed_iterations,
            "estimation task starting"
        );

        let theta_path = output_path(&config.theta_file_prefix, task_id);
        let dza_path = output_path(&config.dza_file_prefix, task_id);
        let mut theta_stream = StatStream::new(open_output(&theta_path)?);
        let mut dza_stream = StatStream::new(open_output(&dza_path)?);
        theta_stream
            .header(config.use_ifd_sampler, effects.names(), true)
            .map_err(|source| EstimError::Output {
                path: theta_path.clone(),
                source,
            })?;
        dza_stream
            .header(config.use_ifd_sampler, effects.names(), false)
            .map_err(|source| EstimError::Output {
                path: dza_path.clone(),
                source,
            })?;

        let seed_params = SeedParams {
            iterations: seed_iterations,
            aca_s: config.aca_s,
        };
        let seed_estimate = seed_phase(
            &mut g,
            &effects,
            &seed_params,
            &settings,
            &mut ifd_aux,
            &mut rng,
            &mut theta_stream,
        )
        .map_err(|source| EstimError::Output {
            path: theta_path.clone(),
            source,
        })?;

        let ee_params = EquilibriumParams {
            outer_iterations: config.ee_steps,
            inner_iterations: config.ee_inner_steps,
            aca_ee: config.aca_ee,
            comp_c: config.comp_c,
            mean_floor: config.theta_mean_floor,
            sd_threshold: config.theta_sd_threshold,
            output_all_steps: config.output_all_steps,
        };
        let theta = equilibrium_phase(
            &mut g,
            &effects,
            seed_estimate,
            &ee_params,
            &settings,
            &mut ifd_aux,
            &mut rng,
            &mut theta_stream,
            &mut dza_stream,
        )
        .map_err(|source| EstimError::Output {
            path: theta_path.clone(),
            source,
        })?;

        if config.output_simulated_network {
            let sim_path = PathBuf::from(format!(
                "{}_{}.net",
                config.sim_net_file_prefix, task_id
            ));
            write_pajek(&g, &sim_path)?;
        }

        info!(task = task_id, ?theta, "estimation task finished");
        Ok(TaskSummary {
            effect_names: effects.names().map(str::to_owned).collect(),
            theta,
            n: g.n(),
            arc_count: g.arc_count(),
            seed_iterations,
        })
    }
}

fn output_path(prefix: &str, task_id: u32) -> PathBuf {
    PathBuf::from(format!("{prefix}_{task_id}.txt"))
}

fn open_output(path: &std::path::Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|source| EstimError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

fn attach_attributes(g: &mut Digraph, config: &EstimConfig) -> Result<()> {
    if let Some(path) = &config.binattr_file {
        for column in read_binary_columns(path)? {
            check_rows(path, g.n(), column.len())?;
            g.attach_binary(column);
        }
    }
    if let Some(path) = &config.catattr_file {
        for column in read_categorical_columns(path)? {
            check_rows(path, g.n(), column.len())?;
            g.attach_categorical(column);
        }
    }
    if let Some(path) = &config.contattr_file {
        for column in read_continuous_columns(path)? {
            check_rows(path, g.n(), column.len())?;
            g.attach_continuous(column);
        }
    }
    if let Some(path) = &config.setattr_file {
        for column in read_set_columns(path)? {
            check_rows(path, g.n(), column.len())?;
            g.attach_set(column);
        }
    }
    Ok(())
}

fn attach_zones(g: &mut Digraph, config: &EstimConfig) -> Result<()> {
    let path = config
        .zone_file
        .as_ref()
        .ok_or(ConfigError::MissingKey { key: "zoneFile" })?;
    let zones = read_zones(path)?;
    check_rows(path, g.n(), zones.len())?;
    g.attach_zones(zones);
    let inner = g.snowball().map_or(0, |s| s.inner_nodes().len());
    if inner < 2 {
        return Err(ConfigError::IncompatibleOptions {
            reason: "conditional estimation requires at least two nodes inside the \
                     outermost wave"
                .to_owned(),
        }
        .into());
    }
    Ok(())
}

fn check_rows(path: &std::path::Path, expected: u32, got: usize) -> Result<()> {
    if got == expected as usize {
        Ok(())
    } else {
        Err(GraphError::NodeCountMismatch {
            path: path.to_path_buf(),
            expected,
            got,
        }
        .into())
    }
}
