//! Error types for the evolutionary optimizer.
//!
//! Precondition violations (mismatched genome lengths, empty populations)
//! are caller bugs and panic instead of surfacing here.

use thiserror::Error;

/// Errors reported by configuration validation and the evolution loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GaError {
    /// A static configuration mistake, detected before any generation runs.
    #[error("invalid configuration `{field}`: {reason}")]
    Config {
        /// Name of the offending configuration field.
        field: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Fitness values that make a selection strategy undefined,
    /// e.g. roulette selection over a zero total.
    #[error("degenerate fitness: {reason}")]
    DegenerateFitness {
        /// Description of the numeric state.
        reason: String,
    },

    /// The initial population could not be filled with unique genomes.
    #[error("could only generate {generated} unique genomes out of {requested}")]
    PopulationExhausted {
        /// Configured population size.
        requested: usize,
        /// Unique genomes produced before giving up.
        generated: usize,
    },
}

impl GaError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        GaError::Config {
            field,
            reason: reason.into(),
        }
    }
}
