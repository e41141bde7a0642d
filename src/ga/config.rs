//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use super::operators::{Crossover, Mutation};
use super::selection::Selection;
use super::types::GenomeKind;
use super::weights::OperatorWeights;
use crate::error::GaError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the Genetic Algorithm.
///
/// Controls population size, selection strategy, operator chances and
/// weights, elitism and termination conditions.
///
/// # Defaults
///
/// ```
/// use evosearch::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 500);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use evosearch::ga::{Crossover, GaConfig, OperatorWeights, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_selection(Selection::Tournament(5))
///     .with_elite_count(4)
///     .with_crossover_weights(
///         OperatorWeights::new(vec![(Crossover::Order, 50), (Crossover::PartialMapped, 50)])?,
///     )
///     .with_mutation_chance(10);
/// # Ok::<(), evosearch::GaError>(())
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Number of consecutive generations without a change in the best
    /// fitness that is tolerated. The run stops once the stagnation
    /// counter exceeds this value.
    ///
    /// Set to 0 to disable early stopping.
    pub early_stop: usize,

    /// Number of top individuals carried over unchanged each generation.
    pub elite_count: usize,

    /// Percent chance (0–100) that a parent pair is recombined.
    ///
    /// When crossover is not applied, both parents pass through unchanged.
    pub crossover_chance: u8,

    /// Percent chance (0–100) that an offspring is mutated.
    pub mutation_chance: u8,

    /// Relative weights of the crossover variants.
    pub crossover_weights: OperatorWeights<Crossover>,

    /// Relative weights of the mutation variants.
    pub mutation_weights: OperatorWeights<Mutation>,

    /// Selection strategy for choosing parents.
    pub selection: Selection,

    /// Fraction of the population selected as parents each generation,
    /// in (0, 1]. The parent count is `round(parent_ratio * population_size)`.
    pub parent_ratio: f64,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked at generation boundaries, so the actual runtime may exceed
    /// the limit by one generation's worth of work.
    pub time_limit_ms: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            early_stop: 50,
            elite_count: 1,
            crossover_chance: 95,
            mutation_chance: 15,
            crossover_weights: OperatorWeights::single(Crossover::PartialMapped),
            mutation_weights: OperatorWeights::single(Mutation::Swap),
            selection: Selection::default(),
            parent_ratio: 0.8,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the early-stop stagnation threshold (0 to disable).
    pub fn with_early_stop(mut self, generations: usize) -> Self {
        self.early_stop = generations;
        self
    }

    /// Sets the number of elites.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the crossover chance in percent.
    pub fn with_crossover_chance(mut self, percent: u8) -> Self {
        self.crossover_chance = percent.min(100);
        self
    }

    /// Sets the mutation chance in percent.
    pub fn with_mutation_chance(mut self, percent: u8) -> Self {
        self.mutation_chance = percent.min(100);
        self
    }

    /// Sets the crossover variant weights.
    pub fn with_crossover_weights(mut self, weights: OperatorWeights<Crossover>) -> Self {
        self.crossover_weights = weights;
        self
    }

    /// Sets the mutation variant weights.
    pub fn with_mutation_weights(mut self, weights: OperatorWeights<Mutation>) -> Self {
        self.mutation_weights = weights;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Convenience builder for setting tournament size.
    ///
    /// Equivalent to `.with_selection(Selection::Tournament(k))`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Sets the parent ratio.
    pub fn with_parent_ratio(mut self, ratio: f64) -> Self {
        self.parent_ratio = ratio;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Preset for routing problems on permutation genomes.
    ///
    /// - Population: 100, Generations: 5000, Early stop: 1000
    /// - Crossover: 95% PMX
    /// - Mutation: 15% {inversion 25, scramble 25, swap 50}
    /// - Tournament size 3, one elite
    pub fn routing() -> Self {
        Self {
            population_size: 100,
            max_generations: 5_000,
            early_stop: 1_000,
            elite_count: 1,
            crossover_chance: 95,
            mutation_chance: 15,
            crossover_weights: OperatorWeights::single(Crossover::PartialMapped),
            mutation_weights: OperatorWeights::from_static(&[
                (Mutation::Inversion, 25),
                (Mutation::Scramble, 25),
                (Mutation::Swap, 50),
            ]),
            selection: Selection::Tournament(3),
            ..Self::default()
        }
    }

    /// Preset for behavioral strategies on categorical genomes.
    ///
    /// - Population: 10, Generations: 500, early stopping disabled
    /// - Crossover: 95% single-point
    /// - Mutation: 15% {scramble 50, swap 50}
    /// - Tournament size 3, three elites
    pub fn strategy() -> Self {
        Self {
            population_size: 10,
            max_generations: 500,
            early_stop: 0,
            elite_count: 3,
            crossover_chance: 95,
            mutation_chance: 15,
            crossover_weights: OperatorWeights::single(Crossover::SinglePoint),
            mutation_weights: OperatorWeights::from_static(&[
                (Mutation::Scramble, 50),
                (Mutation::Swap, 50),
            ]),
            selection: Selection::Tournament(3),
            ..Self::default()
        }
    }

    /// Number of parents selected each generation.
    pub fn parent_count(&self) -> usize {
        (self.parent_ratio * self.population_size as f64).round() as usize
    }

    /// Validates the problem-independent parameters.
    ///
    /// Returns [`GaError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), GaError> {
        if self.population_size < 2 {
            return Err(GaError::config(
                "population_size",
                format!("must be at least 2, got {}", self.population_size),
            ));
        }
        if self.max_generations == 0 {
            return Err(GaError::config("max_generations", "must be at least 1"));
        }
        if self.elite_count >= self.population_size {
            return Err(GaError::config(
                "elite_count",
                format!(
                    "{} elites would fill the entire population of {}",
                    self.elite_count, self.population_size
                ),
            ));
        }
        if self.crossover_chance > 100 {
            return Err(GaError::config(
                "crossover_chance",
                format!("must be a percentage, got {}", self.crossover_chance),
            ));
        }
        if self.mutation_chance > 100 {
            return Err(GaError::config(
                "mutation_chance",
                format!("must be a percentage, got {}", self.mutation_chance),
            ));
        }
        if !(self.parent_ratio > 0.0 && self.parent_ratio <= 1.0) {
            return Err(GaError::config(
                "parent_ratio",
                format!("must be in (0, 1], got {}", self.parent_ratio),
            ));
        }
        if self.parent_count() == 0 {
            return Err(GaError::config(
                "parent_ratio",
                "selects no parents for this population size",
            ));
        }
        if let Selection::Tournament(size) = self.selection {
            if size == 0 || size > self.population_size {
                return Err(GaError::config(
                    "selection",
                    format!(
                        "tournament size must be in 1..={}, got {size}",
                        self.population_size
                    ),
                ));
            }
        }
        if self.time_limit_ms == Some(0) {
            return Err(GaError::config(
                "time_limit_ms",
                "must be positive or None",
            ));
        }
        Ok(())
    }

    /// Validates the configuration against a concrete genome shape.
    ///
    /// On top of [`validate`](Self::validate), rejects empty genomes,
    /// crossover variants that would break the genome invariant, and
    /// search spaces too small to hold a population of distinct genomes.
    pub fn validate_for(&self, kind: GenomeKind, genome_len: usize) -> Result<(), GaError> {
        self.validate()?;

        if genome_len == 0 {
            return Err(GaError::config("genome_len", "genomes must not be empty"));
        }
        if let GenomeKind::Categorical { alphabet_size } = kind {
            if alphabet_size < 2 {
                return Err(GaError::config(
                    "genome_kind",
                    format!("categorical alphabet needs at least 2 symbols, got {alphabet_size}"),
                ));
            }
        }
        if let Some(bad) = self.crossover_weights.variants().find(|c| !c.supports(kind)) {
            return Err(GaError::config(
                "crossover_weights",
                format!("{bad:?} cannot be applied to {kind:?} genomes"),
            ));
        }
        let space = kind.search_space(genome_len);
        if space < self.population_size {
            return Err(GaError::config(
                "population_size",
                format!(
                    "only {space} distinct genomes of length {genome_len} exist, \
                     cannot hold {} unique individuals",
                    self.population_size
                ),
            ));
        }
        Ok(())
    }
}
