//! Selection strategies for the GA.
//!
//! Selection determines which individuals are chosen as parents for
//! crossover. Both strategies assume **maximization** of
//! [`Individual::fitness`].
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::types::Individual;
use crate::error::GaError;
use rand::seq::index;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Selection strategy for choosing parents.
///
/// # Examples
///
/// ```
/// use evosearch::ga::Selection;
///
/// // Tournament with size 3 (moderate selection pressure)
/// let sel = Selection::Tournament(3);
///
/// // Roulette wheel (fitness-proportionate)
/// let sel: Selection = "roulette".parse().unwrap();
/// assert_eq!(sel, Selection::Roulette);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Selection {
    /// Tournament selection: draw `T` distinct individuals, keep the fittest.
    ///
    /// Higher `T` = stronger selection pressure. Ties go to the
    /// individual drawn first.
    ///
    /// # Complexity
    /// O(T) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Individual `i` is drawn with probability `fitness_i / Σ fitness`.
    /// Requires non-negative finite fitness with a positive total.
    ///
    /// # Complexity
    /// O(n) setup, O(log n) per selection
    Roulette,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Selects `k` parent indices from the population, with replacement
    /// across picks.
    ///
    /// # Errors
    /// [`GaError::DegenerateFitness`] when roulette selection meets
    /// negative, non-finite or all-zero fitness.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<G, R: Rng>(
        &self,
        population: &[Individual<G>],
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, GaError> {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        match self {
            Selection::Tournament(size) => Ok((0..k)
                .map(|_| tournament(population, *size, rng))
                .collect()),
            Selection::Roulette => roulette(population, k, rng),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Tournament(size) => write!(f, "tournament:{size}"),
            Selection::Roulette => f.write_str("roulette"),
        }
    }
}

impl FromStr for Selection {
    type Err = GaError;

    /// Parses `"tournament"`, `"tournament:<size>"` or `"roulette"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.split_once(':') {
            None if s == "roulette" => Ok(Selection::Roulette),
            None if s == "tournament" => Ok(Selection::default()),
            Some(("tournament", size)) => size
                .trim()
                .parse::<usize>()
                .map(Selection::Tournament)
                .map_err(|_| GaError::config("selection", format!("invalid tournament size `{size}`"))),
            _ => Err(GaError::config(
                "selection",
                format!("unknown selection strategy `{s}`"),
            )),
        }
    }
}

/// Tournament selection: draw `size` distinct individuals, return the best.
fn tournament<G, R: Rng>(population: &[Individual<G>], size: usize, rng: &mut R) -> usize {
    let n = population.len();
    let size = size.clamp(1, n);

    let draw = index::sample(rng, n, size);
    let mut best_idx = draw.index(0);
    for idx in draw.iter().skip(1) {
        if population[idx].fitness > population[best_idx].fitness {
            best_idx = idx;
        }
    }
    best_idx
}

/// Roulette wheel selection over raw fitness.
fn roulette<G, R: Rng>(
    population: &[Individual<G>],
    k: usize,
    rng: &mut R,
) -> Result<Vec<usize>, GaError> {
    if let Some((i, ind)) = population
        .iter()
        .enumerate()
        .find(|(_, ind)| !ind.fitness.is_finite() || ind.fitness < 0.0)
    {
        return Err(GaError::DegenerateFitness {
            reason: format!(
                "roulette selection needs finite non-negative fitness, individual {i} has {}",
                ind.fitness
            ),
        });
    }

    let cumulative: Vec<f64> = population
        .iter()
        .scan(0.0, |acc, ind| {
            *acc += ind.fitness;
            Some(*acc)
        })
        .collect();
    let total = cumulative[cumulative.len() - 1];
    if total <= 0.0 || !total.is_finite() {
        return Err(GaError::DegenerateFitness {
            reason: format!("roulette selection needs a positive fitness total, got {total}"),
        });
    }

    let picks = (0..k)
        .map(|_| {
            let threshold = rng.random_range(0.0..total);
            // First slot whose cumulative weight exceeds the threshold;
            // zero-fitness slots are never hit.
            let i = cumulative.partition_point(|&c| c <= threshold);
            i.min(population.len() - 1)
        })
        .collect();
    Ok(picks)
}
