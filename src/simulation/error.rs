//! Error type shared by the network, population and session layers.

use super::brain::Topology;

/// Errors raised when a caller breaks a contract of the evolutionary core.
///
/// None of these are recoverable at runtime: they indicate a mismatched
/// vector, a bad configuration, or a generation evolved too early. Every
/// operation that returns one leaves its receiver untouched.
#[derive(Debug, thiserror::Error)]
pub enum EvoError {
    /// `predict` was called with the wrong number of inputs.
    #[error("expected {expected} network inputs, got {actual}")]
    InputLength {
        /// Configured input count.
        expected: usize,
        /// Length of the supplied vector.
        actual: usize,
    },
    /// `evolve` was called with a fitness vector of the wrong length.
    #[error("expected {expected} fitness scores, got {actual}")]
    FitnessLength {
        /// Population size.
        expected: usize,
        /// Length of the supplied vector.
        actual: usize,
    },
    /// A fitness score was NaN or infinite.
    #[error("fitness score at index {index} is not finite ({value})")]
    InvalidFitness {
        /// Position of the offending score.
        index: usize,
        /// The offending value.
        value: f64,
    },
    /// Two networks (or a network and its declared shape) disagree on topology.
    #[error("network topology mismatch: {left} vs {right}")]
    TopologyMismatch {
        /// Topology of the first operand.
        left: Topology,
        /// Topology of the second operand.
        right: Topology,
    },
    /// A size, rate or count is outside its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Evolution was requested while agents are still running.
    #[error("generation still in progress: {alive} agents alive")]
    GenerationInProgress {
        /// Number of agents that have not died yet.
        alive: usize,
    },
    /// Reading or writing a population file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A population file could not be (de)serialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvoError>;
