//! Fixed-size population with value-based duplicate tracking.

use super::types::{Gene, Individual};
use std::collections::HashMap;

/// An ordered, fixed-length collection of individuals.
///
/// Alongside the slots it keeps a multiset of genomes, updated on every
/// replacement, so membership checks are O(n) hashing of one genome
/// instead of a scan of the whole population.
#[derive(Debug, Clone)]
pub struct Population<G: Gene> {
    members: Vec<Individual<G>>,
    genomes: HashMap<Vec<G>, usize>,
}

impl<G: Gene> Population<G> {
    /// Builds a population from individuals, duplicates allowed.
    pub fn new(members: Vec<Individual<G>>) -> Self {
        let mut genomes = HashMap::with_capacity(members.len());
        for ind in &members {
            *genomes.entry(ind.genome.clone()).or_insert(0) += 1;
        }
        Self { members, genomes }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Individual<G>] {
        &self.members
    }

    /// Whether any member carries exactly this genome.
    pub fn contains(&self, genome: &[G]) -> bool {
        self.genomes.contains_key(genome)
    }

    /// Number of distinct genomes currently held.
    pub fn distinct(&self) -> usize {
        self.genomes.len()
    }

    /// Overwrites `slot` and returns the evicted individual.
    ///
    /// # Panics
    /// Panics if `slot` is out of range.
    pub fn replace(&mut self, slot: usize, individual: Individual<G>) -> Individual<G> {
        *self.genomes.entry(individual.genome.clone()).or_insert(0) += 1;
        let evicted = std::mem::replace(&mut self.members[slot], individual);
        self.forget(&evicted.genome);
        evicted
    }

    fn forget(&mut self, genome: &[G]) {
        if let Some(count) = self.genomes.get_mut(genome) {
            *count -= 1;
            if *count == 0 {
                self.genomes.remove(genome);
            }
        }
    }

    /// Sorts by descending fitness. The sort is stable, so equally fit
    /// members keep their relative order.
    pub fn sort_by_fitness(&mut self) {
        self.members.sort_by(|a, b| {
            b.fitness
                .partial_cmp(&a.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// The first member. After [`sort_by_fitness`](Self::sort_by_fitness)
    /// this is the fittest.
    ///
    /// # Panics
    /// Panics if the population is empty.
    pub fn best(&self) -> &Individual<G> {
        self.members.first().expect("population must not be empty")
    }

    /// Mean objective over all members.
    pub fn mean_objective(&self) -> f64 {
        if self.members.is_empty() {
            return f64::NAN;
        }
        self.members.iter().map(|ind| ind.objective).sum::<f64>() / self.members.len() as f64
    }
}
