//! Error types for the pulse network

use thiserror::Error;

/// Error raised while parsing the network description
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphParseError {
    /// A `->` line whose left-hand side has no module name
    #[error("line {line}: module declaration has an empty name")]
    EmptyName { line: usize },
    /// The same module declared on two lines
    #[error("line {line}: module `{name}` is declared more than once")]
    DuplicateModule { line: usize, name: String },
}

/// Error raised while simulating or analysing a parsed network
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// A single press kept producing pulses past the configured cap
    #[error("press {press} did not settle after {pulses} pulses")]
    SimulationDiverged { press: u64, pulses: usize },
    /// The network does not have the counter layout the extrapolator relies on
    #[error("unsupported topology for cycle extrapolation: {reason}")]
    UnsupportedTopology { reason: String },
    /// Brute-force search gave up
    #[error("`{terminal}` received no low pulse within {limit} presses")]
    PressLimitReached { terminal: String, limit: u64 },
    /// A module name that does not appear anywhere in the network
    #[error("module `{0}` is not part of the network")]
    UnknownModule(String),
    /// A memory snapshot built for another network
    #[error("memory does not match the network at module `{module}`")]
    MemoryMismatch { module: String },
}

impl NetworkError {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        NetworkError::UnsupportedTopology {
            reason: reason.into(),
        }
    }
}
