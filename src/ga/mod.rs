//! Generational evolutionary optimizer.
//!
//! A problem plugs in by implementing [`GaProblem`]: it describes the
//! genome shape, draws random genomes and scores them. The engine owns
//! everything else: population, operators, selection, elitism and
//! stopping rules.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, operator weights, presets)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Best individual, per-generation records and run summary
//! - [`OperatorWeights`]: Validated percentage table over operator variants
//! - [`Population`]: Fixed-size population with duplicate tracking
//!
//! # Submodules
//!
//! - [`operators`]: Crossover (OX, PMX, single-point) and mutation
//!   (swap, scramble, inversion) operators
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
pub mod operators;
mod population;
mod runner;
mod selection;
mod types;
mod weights;

pub use config::GaConfig;
pub use operators::{Crossover, Mutation};
pub use population::Population;
pub use runner::{GaResult, GaRunner, GenerationRecord, StopReason};
pub use selection::Selection;
pub use types::{Action, GaProblem, Gene, GenomeKind, Individual, Score};
pub use weights::{OperatorWeights, TOTAL_WEIGHT};
