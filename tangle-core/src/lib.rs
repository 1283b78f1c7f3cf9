//! Tangle core library.
//!
//! Monte-Carlo maximum-likelihood estimation of exponential random graph
//! model parameters for directed networks, by the equilibrium-expectation
//! method: a Metropolis toggle sampler (basic or fixed-density) coupled
//! to a two-phase parameter updater that matches the expected drift of
//! the sufficient statistics to the observed network.

mod algorithm;
mod config;
mod error;
mod estimation;
mod graph;
mod io;
mod sampler;
mod stats;

pub use crate::{
    algorithm::{
        EquilibriumParams, SamplerSettings, SeedEstimate, SeedParams, StatStream,
        equilibrium_phase, seed_phase,
    },
    config::{EffectSpec, EstimConfig},
    error::{
        ConfigError, ConfigErrorCode, EstimError, GraphError, GraphErrorCode, Result,
    },
    estimation::{EstimationTask, TaskSummary, mix_task_seed},
    graph::{
        AttributeStore, BinaryColumn, CategoricalColumn, ContinuousColumn, Digraph, NodeId,
        SetColumn, Snowball,
    },
    io::{
        read_binary_columns, read_categorical_columns, read_continuous_columns, read_pajek,
        read_set_columns, read_zones, write_pajek,
    },
    sampler::{IfdSweep, SweepOptions, SweepStats, basic_sweep, ifd_sweep},
    stats::{Effect, EffectKind, EffectSet},
};

#[cfg(test)]
pub(crate) mod test_utils;
