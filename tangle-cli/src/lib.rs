//! Command-line frontend for tangle estimation tasks.

pub mod cli;
pub mod logging;
