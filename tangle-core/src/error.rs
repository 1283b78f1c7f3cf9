//! Error types for the tangle core library.
//!
//! Defines the error enums exposed by the public API and a convenient
//! result alias. Every fatal failure mode carries enough context (file,
//! line, offending name) to be reported without consulting the call site.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Stable codes describing [`ConfigError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ConfigErrorCode {
    /// The configuration file could not be read.
    Io,
    /// A line did not parse as `key = value`.
    Syntax,
    /// The key is not recognised.
    UnknownKey,
    /// The value did not parse as the key's type.
    InvalidValue,
    /// A required key was absent.
    MissingKey,
    /// An effect name is not in the catalog.
    UnknownEffect,
    /// An effect named an attribute column that was never loaded.
    UnresolvedAttribute,
    /// An effect was given the wrong number of arguments.
    EffectArity,
    /// Two options cannot be enabled together.
    IncompatibleOptions,
}

impl ConfigErrorCode {
    /// Return the stable machine-readable representation of this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "CONFIG_IO",
            Self::Syntax => "CONFIG_SYNTAX",
            Self::UnknownKey => "CONFIG_UNKNOWN_KEY",
            Self::InvalidValue => "CONFIG_INVALID_VALUE",
            Self::MissingKey => "CONFIG_MISSING_KEY",
            Self::UnknownEffect => "CONFIG_UNKNOWN_EFFECT",
            Self::UnresolvedAttribute => "CONFIG_UNRESOLVED_ATTRIBUTE",
            Self::EffectArity => "CONFIG_EFFECT_ARITY",
            Self::IncompatibleOptions => "CONFIG_INCOMPATIBLE_OPTIONS",
        }
    }
}

impl fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised while parsing or validating an estimation configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration `{path}`: {source}")]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A line did not parse as `key = value`.
    #[error("line {line}: {reason}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// Description of what was malformed.
        reason: String,
    },
    /// The key is not recognised.
    #[error("line {line}: unknown configuration key `{key}`")]
    UnknownKey {
        /// The offending key as written.
        key: String,
        /// 1-based line number.
        line: usize,
    },
    /// The value did not parse as the key's type.
    #[error("line {line}: invalid value `{value}` for key `{key}`")]
    InvalidValue {
        /// Lower-cased key name.
        key: String,
        /// The offending value as written.
        value: String,
        /// 1-based line number.
        line: usize,
    },
    /// A required key was absent.
    #[error("required configuration key `{key}` is missing")]
    MissingKey {
        /// The missing key.
        key: &'static str,
    },
    /// An effect name is not in the catalog.
    #[error("unknown effect `{name}` in `{list}`")]
    UnknownEffect {
        /// The unrecognised effect name.
        name: String,
        /// The set-valued key it appeared in.
        list: &'static str,
    },
    /// An effect named an attribute column that was never loaded.
    #[error("effect `{effect}` references unknown attribute `{attribute}`")]
    UnresolvedAttribute {
        /// The effect whose binding failed.
        effect: String,
        /// The attribute column name that could not be found.
        attribute: String,
    },
    /// An effect was given the wrong number of arguments.
    #[error("effect `{effect}` takes {expected} argument(s) but was given {got}")]
    EffectArity {
        /// The effect whose argument list was wrong.
        effect: String,
        /// Number of arguments the effect takes.
        expected: usize,
        /// Number of arguments supplied.
        got: usize,
    },
    /// Two options cannot be enabled together.
    #[error("{reason}")]
    IncompatibleOptions {
        /// Why the combination is rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Retrieve the stable [`ConfigErrorCode`] for this error.
    pub const fn code(&self) -> ConfigErrorCode {
        match self {
            Self::Io { .. } => ConfigErrorCode::Io,
            Self::Syntax { .. } => ConfigErrorCode::Syntax,
            Self::UnknownKey { .. } => ConfigErrorCode::UnknownKey,
            Self::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
            Self::MissingKey { .. } => ConfigErrorCode::MissingKey,
            Self::UnknownEffect { .. } => ConfigErrorCode::UnknownEffect,
            Self::UnresolvedAttribute { .. } => ConfigErrorCode::UnresolvedAttribute,
            Self::EffectArity { .. } => ConfigErrorCode::EffectArity,
            Self::IncompatibleOptions { .. } => ConfigErrorCode::IncompatibleOptions,
        }
    }
}

/// Stable codes describing [`GraphError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum GraphErrorCode {
    /// A graph or attribute file could not be read or written.
    Io,
    /// The file did not follow its declared format.
    Malformed,
    /// An arc had identical endpoints.
    SelfLoop,
    /// The same arc appeared twice.
    DuplicateArc,
    /// A vertex id fell outside `1..=n`.
    VertexOutOfRange,
    /// A node-indexed file did not have one row per node.
    NodeCountMismatch,
    /// Snowball zones were not contiguous from zero.
    NonContiguousZones,
}

impl GraphErrorCode {
    /// Return the stable machine-readable representation of this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "GRAPH_IO",
            Self::Malformed => "GRAPH_MALFORMED",
            Self::SelfLoop => "GRAPH_SELF_LOOP",
            Self::DuplicateArc => "GRAPH_DUPLICATE_ARC",
            Self::VertexOutOfRange => "GRAPH_VERTEX_OUT_OF_RANGE",
            Self::NodeCountMismatch => "GRAPH_NODE_COUNT_MISMATCH",
            Self::NonContiguousZones => "GRAPH_NON_CONTIGUOUS_ZONES",
        }
    }
}

impl fmt::Display for GraphErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised while loading, validating, or writing network data.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GraphError {
    /// A graph or attribute file could not be read or written.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The file did not follow its declared format.
    #[error("`{path}` line {line}: {reason}")]
    Malformed {
        /// Path of the offending file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Description of what was malformed.
        reason: String,
    },
    /// An arc had identical endpoints.
    #[error("`{path}` line {line}: self-loop on vertex {vertex}")]
    SelfLoop {
        /// Path of the offending file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The 1-based vertex id as written.
        vertex: u32,
    },
    /// The same arc appeared twice.
    #[error("`{path}` line {line}: duplicate arc {from} -> {to}")]
    DuplicateArc {
        /// Path of the offending file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// 1-based source vertex.
        from: u32,
        /// 1-based target vertex.
        to: u32,
    },
    /// A vertex id fell outside `1..=n`.
    #[error("`{path}` line {line}: vertex {vertex} outside 1..={n}")]
    VertexOutOfRange {
        /// Path of the offending file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The offending id as written.
        vertex: i64,
        /// Declared vertex count.
        n: u32,
    },
    /// A node-indexed file did not have one row per node.
    #[error("`{path}` has {got} rows but the graph has {expected} nodes")]
    NodeCountMismatch {
        /// Path of the offending file.
        path: PathBuf,
        /// Number of nodes in the graph.
        expected: u32,
        /// Number of data rows found.
        got: usize,
    },
    /// Snowball zones were not contiguous from zero.
    #[error("`{path}`: zone {zone} is present but zone {missing} is empty")]
    NonContiguousZones {
        /// Path of the zone file.
        path: PathBuf,
        /// A populated zone index.
        zone: u32,
        /// The empty zone below it.
        missing: u32,
    },
}

impl GraphError {
    /// Retrieve the stable [`GraphErrorCode`] for this error.
    pub const fn code(&self) -> GraphErrorCode {
        match self {
            Self::Io { .. } => GraphErrorCode::Io,
            Self::Malformed { .. } => GraphErrorCode::Malformed,
            Self::SelfLoop { .. } => GraphErrorCode::SelfLoop,
            Self::DuplicateArc { .. } => GraphErrorCode::DuplicateArc,
            Self::VertexOutOfRange { .. } => GraphErrorCode::VertexOutOfRange,
            Self::NodeCountMismatch { .. } => GraphErrorCode::NodeCountMismatch,
            Self::NonContiguousZones { .. } => GraphErrorCode::NonContiguousZones,
        }
    }
}

/// Error type produced when running an estimation task.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EstimError {
    /// Configuration parsing or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Network or attribute data could not be loaded.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// An output stream could not be opened or written.
    #[error("failed to write `{path}`: {source}")]
    Output {
        /// Path of the output file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

impl EstimError {
    /// Retrieve the stable machine-readable code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(err) => err.code().as_str(),
            Self::Graph(err) => err.code().as_str(),
            Self::Output { .. } => "ESTIM_OUTPUT",
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, EstimError>;
