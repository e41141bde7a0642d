//! Generational evolutionary search over fixed-length genomes.
//!
//! Two genome shapes are supported:
//!
//! - **Permutation** genomes (`Vec<usize>` over `0..N`), e.g. tour orders
//!   for routing problems, recombined with order or partial-mapped
//!   crossover so every child stays a permutation.
//! - **Categorical** genomes over a small alphabet, e.g. move sequences of
//!   [`ga::Action`] for iterated prisoner's dilemma strategies, recombined
//!   with single-point crossover.
//!
//! The loop is single-threaded and deterministic for a given seed: one
//! random generator is created per run and threaded through every
//! operator and selection call.
//!
//! Problem-specific pieces (file parsing, distance matrices, payoff
//! tables, plotting, persistence) live with the caller, who implements
//! [`ga::GaProblem`].

pub mod error;
pub mod ga;
pub mod random;

pub use error::GaError;
