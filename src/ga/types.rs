//! Core types for the GA framework.
//!
//! [`Individual`] pairs a genome with its cached scores and [`GaProblem`]
//! defines the contract between the generic engine and a concrete problem
//! (routing, strategy evolution, ...).

use rand::Rng;
use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single genome symbol.
///
/// Implemented for every type that is cheaply copyable and hashable, so
/// `usize` city indices and [`Action`] moves both qualify.
pub trait Gene: Copy + Eq + Hash + fmt::Debug + 'static {}

impl<T: Copy + Eq + Hash + fmt::Debug + 'static> Gene for T {}

/// Shape of the genomes a problem produces.
///
/// Used at configuration time to reject operators that would break the
/// genome invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GenomeKind {
    /// Every symbol of `0..N` appears exactly once.
    Permutation,
    /// Symbols drawn from an alphabet of `alphabet_size`, repetition allowed.
    Categorical {
        /// Number of distinct symbols.
        alphabet_size: usize,
    },
}

impl GenomeKind {
    /// Number of distinct genomes of length `len`, saturating at `usize::MAX`.
    pub fn search_space(&self, len: usize) -> usize {
        match *self {
            GenomeKind::Permutation => (1..=len).fold(1usize, |acc, k| acc.saturating_mul(k)),
            GenomeKind::Categorical { alphabet_size } => {
                (0..len).fold(1usize, |acc, _| acc.saturating_mul(alphabet_size))
            }
        }
    }
}

/// A move in the iterated prisoner's dilemma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Action {
    /// Cooperate with the opponent, printed as `C`.
    Cooperate,
    /// Defect against the opponent, printed as `D`.
    Defect,
}

impl Action {
    /// Both moves, in a fixed order.
    pub const ALL: [Action; 2] = [Action::Cooperate, Action::Defect];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Cooperate => f.write_str("C"),
            Action::Defect => f.write_str("D"),
        }
    }
}

/// Scores produced by a problem evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Score {
    /// Problem-specific cost. Lower is better.
    pub objective: f64,
    /// Selection score. Higher is better.
    pub fitness: f64,
}

impl Score {
    /// Score for a minimized cost with `fitness = 1 / objective`.
    pub fn from_cost(objective: f64) -> Self {
        Self {
            objective,
            fitness: 1.0 / objective,
        }
    }

    /// Score for a maximized payoff. The objective mirrors it negated so
    /// that "lower is better" still holds.
    pub fn from_payoff(fitness: f64) -> Self {
        Self {
            objective: -fitness,
            fitness,
        }
    }

    /// Placeholder for genomes that have not been evaluated yet.
    pub fn unevaluated() -> Self {
        Self {
            objective: f64::INFINITY,
            fitness: f64::NEG_INFINITY,
        }
    }
}

/// A candidate solution: a genome plus its cached scores.
///
/// Equality and hashing look at the genome only, so two individuals with
/// the same genome are duplicates regardless of their scores.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Individual<G> {
    /// The encoded solution.
    pub genome: Vec<G>,
    /// Cost, lower is better.
    pub objective: f64,
    /// Selection score, higher is better.
    pub fitness: f64,
}

impl<G: Gene> Individual<G> {
    /// Wraps a genome that has not been scored yet.
    pub fn new(genome: Vec<G>) -> Self {
        Self::with_score(genome, Score::unevaluated())
    }

    /// Wraps a genome together with its score.
    pub fn with_score(genome: Vec<G>, score: Score) -> Self {
        Self {
            genome,
            objective: score.objective,
            fitness: score.fitness,
        }
    }

    /// Replaces the cached scores.
    pub fn set_score(&mut self, score: Score) {
        self.objective = score.objective;
        self.fitness = score.fitness;
    }
}

impl<G: PartialEq> PartialEq for Individual<G> {
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome
    }
}

impl<G: Eq> Eq for Individual<G> {}

impl<G: Hash> Hash for Individual<G> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.genome.hash(state);
    }
}

/// Defines an optimization problem for the evolution loop.
///
/// The engine owns the population, the operators and the random source.
/// A problem only says what a genome looks like, how to draw a random one,
/// and how to score it.
///
/// # Examples
///
/// ```
/// use evosearch::ga::{GaProblem, GenomeKind, Score};
/// use evosearch::random::random_permutation;
/// use rand::Rng;
///
/// struct Ring { distances: Vec<Vec<f64>> }
///
/// impl GaProblem for Ring {
///     type Gene = usize;
///
///     fn genome_kind(&self) -> GenomeKind { GenomeKind::Permutation }
///     fn genome_len(&self) -> usize { self.distances.len() }
///
///     fn random_genome<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
///         random_permutation(self.genome_len(), rng)
///     }
///
///     fn evaluate(&self, tour: &[usize]) -> Score {
///         let n = tour.len();
///         let length: f64 = (0..n).map(|i| self.distances[tour[i]][tour[(i + 1) % n]]).sum();
///         Score::from_cost(length)
///     }
/// }
/// ```
pub trait GaProblem {
    /// The genome symbol type.
    type Gene: Gene;

    /// The shape of this problem's genomes.
    fn genome_kind(&self) -> GenomeKind;

    /// The fixed genome length.
    fn genome_len(&self) -> usize;

    /// Draws a random valid genome of length [`genome_len`](Self::genome_len).
    fn random_genome<R: Rng>(&self, rng: &mut R) -> Vec<Self::Gene>;

    /// Scores a genome.
    ///
    /// Must be a pure function of the genome.
    fn evaluate(&self, genome: &[Self::Gene]) -> Score;

    /// Called after every completed generation.
    ///
    /// The default implementation is a no-op.
    fn on_generation(&self, _record: &super::GenerationRecord) {}
}
