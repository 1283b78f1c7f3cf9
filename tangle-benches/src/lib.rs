//! Benchmark support crate for tangle.
//!
//! Provides deterministic synthetic networks and effect registries used
//! by the Criterion benchmarks for the samplers and the graph store.

pub mod fixtures;
