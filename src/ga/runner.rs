//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! initialization → rank → convergence check → elites → selection →
//! crossover → mutation → evaluation → replacement → elite restore → repeat.

use super::config::GaConfig;
use super::population::Population;
use super::types::{GaProblem, Gene, Individual};
use crate::error::GaError;
use crate::random::create_rng;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Attempts per population slot before the initial fill gives up.
const FILL_ATTEMPTS_PER_SLOT: usize = 100;

/// Snapshot emitted at the end of every completed generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationRecord {
    /// 1-based generation index.
    pub generation: usize,
    /// Fitness of the fittest individual.
    pub best_fitness: f64,
    /// Objective of the fittest individual.
    pub best_objective: f64,
    /// Mean objective over the population.
    pub mean_objective: f64,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopReason {
    /// Ran all `max_generations`.
    MaxGenerations,
    /// The best fitness did not change for more than `early_stop` generations.
    Stagnation,
    /// The wall-clock limit elapsed.
    TimeLimit,
}

/// Result of a GA optimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaResult<G> {
    /// The fittest individual of the final population.
    pub best: Individual<G>,

    /// Number of generations entered. When the run stopped at a
    /// generation boundary check, that generation is counted even though
    /// it produced no record.
    pub generations: usize,

    /// Why the loop terminated.
    pub stop_reason: StopReason,

    /// One record per completed generation.
    pub history: Vec<GenerationRecord>,

    /// Total run time including initialization.
    pub wall_time: Duration,
}

impl<G> GaResult<G> {
    /// Whether the run was terminated by early stopping.
    pub fn stagnated(&self) -> bool {
        self.stop_reason == StopReason::Stagnation
    }
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```ignore
/// let problem = MyProblem::new();
/// let config = GaConfig::routing().with_seed(42);
/// let result = GaRunner::run(&problem, &config)?;
/// println!("Best objective: {}", result.best.objective);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    ///
    /// # Errors
    /// - [`GaError::Config`] if the configuration is invalid for this
    ///   problem; nothing runs in that case.
    /// - [`GaError::PopulationExhausted`] if the initial population could
    ///   not be filled with distinct genomes.
    /// - [`GaError::DegenerateFitness`] if roulette selection meets
    ///   unusable fitness values mid-run.
    ///
    /// # Panics
    /// Panics if the problem produces genomes of inconsistent length.
    pub fn run<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
    ) -> Result<GaResult<P::Gene>, GaError> {
        config.validate_for(problem.genome_kind(), problem.genome_len())?;

        let started = Instant::now();
        let deadline = config
            .time_limit_ms
            .map(|ms| started + Duration::from_millis(ms));
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = create_rng(seed);

        info!(
            "starting GA: population={}, generations={}, genome_len={}, seed={}",
            config.population_size,
            config.max_generations,
            problem.genome_len(),
            seed
        );

        // 1. Initialize and evaluate population
        let mut population = initial_population(problem, config.population_size, &mut rng)?;
        population.sort_by_fitness();

        // 2. Convergence baseline
        let mut best_fitness = population.best().fitness;
        let mut stagnation_counter = 0usize;

        let mut history = Vec::with_capacity(config.max_generations.min(4096));
        let mut stop_reason = StopReason::MaxGenerations;
        let mut generations = 0;

        // 3. Evolutionary loop
        for gen in 1..=config.max_generations {
            generations = gen;

            // Rank
            population.sort_by_fitness();

            // Convergence check
            let gen_best = population.best().fitness;
            if gen_best == best_fitness {
                stagnation_counter += 1;
            } else {
                stagnation_counter = 0;
                best_fitness = gen_best;
            }
            if config.early_stop > 0 && stagnation_counter > config.early_stop {
                info!(
                    "stopping at generation {gen}: best fitness unchanged for {stagnation_counter} generations"
                );
                stop_reason = StopReason::Stagnation;
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                info!("stopping at generation {gen}: time limit reached");
                stop_reason = StopReason::TimeLimit;
                break;
            }

            let replaced = next_generation(problem, &mut population, config, &mut rng)?;

            // Re-rank and record
            population.sort_by_fitness();
            let best = population.best();
            let record = GenerationRecord {
                generation: gen,
                best_fitness: best.fitness,
                best_objective: best.objective,
                mean_objective: population.mean_objective(),
            };
            debug!(
                "generation {}: best_objective={:.4}, mean_objective={:.4}, replaced={}",
                record.generation, record.best_objective, record.mean_objective, replaced
            );
            problem.on_generation(&record);
            history.push(record);
        }

        let wall_time = started.elapsed();
        let best = population.best().clone();
        info!(
            "GA finished after {} generations ({:?}): best_objective={}, {:?}",
            generations, stop_reason, best.objective, wall_time
        );

        Ok(GaResult {
            best,
            generations,
            stop_reason,
            history,
            wall_time,
        })
    }
}

/// Breeds one generation into a population sorted by descending fitness.
///
/// The first `elite_count` members are captured up front and written back
/// into slots `0..elite_count` after replacement, so the population is
/// left unsorted. Returns the number of slots overwritten by offspring.
fn next_generation<P: GaProblem, R: Rng>(
    problem: &P,
    population: &mut Population<P::Gene>,
    config: &GaConfig,
    rng: &mut R,
) -> Result<usize, GaError> {
    let elites: Vec<Individual<P::Gene>> = population.members()[..config.elite_count].to_vec();

    let parent_idx = config
        .selection
        .select(population.members(), config.parent_count(), rng)?;
    let mut parents: Vec<Individual<P::Gene>> = parent_idx
        .into_iter()
        .map(|i| population.members()[i].clone())
        .collect();

    let mut offspring = recombine(&mut parents, config, rng);
    mutate(&mut offspring, config, rng);
    for child in &mut offspring {
        child.set_score(problem.evaluate(&child.genome));
    }

    let replaced = replace_weakest(population, offspring);

    for (slot, elite) in elites.into_iter().enumerate() {
        population.replace(slot, elite);
    }
    Ok(replaced)
}

/// Draws distinct random genomes and evaluates them.
fn initial_population<P: GaProblem, R: Rng>(
    problem: &P,
    size: usize,
    rng: &mut R,
) -> Result<Population<P::Gene>, GaError> {
    let mut seen: HashSet<Vec<P::Gene>> = HashSet::with_capacity(size);
    let mut members = Vec::with_capacity(size);
    let max_attempts = size.saturating_mul(FILL_ATTEMPTS_PER_SLOT);
    let mut attempts = 0;

    while members.len() < size {
        if attempts == max_attempts {
            return Err(GaError::PopulationExhausted {
                requested: size,
                generated: members.len(),
            });
        }
        attempts += 1;

        let genome = problem.random_genome(rng);
        assert_eq!(
            genome.len(),
            problem.genome_len(),
            "random_genome returned a genome of the wrong length"
        );
        if !seen.insert(genome.clone()) {
            continue;
        }
        let score = problem.evaluate(&genome);
        members.push(Individual::with_score(genome, score));
    }

    if attempts > size * 2 {
        warn!("initial population needed {attempts} draws for {size} distinct genomes");
    }
    Ok(Population::new(members))
}

/// Pairs shuffled parents and applies crossover with the configured chance.
///
/// Pairs that skip crossover, and an odd parent left at the end, pass
/// through unchanged.
fn recombine<G: Gene, R: Rng>(
    parents: &mut [Individual<G>],
    config: &GaConfig,
    rng: &mut R,
) -> Vec<Individual<G>> {
    parents.shuffle(rng);

    let mut offspring = Vec::with_capacity(parents.len());
    for pair in parents.chunks(2) {
        match pair {
            [p1, p2] if rng.random_range(0..100) < config.crossover_chance => {
                let op = config.crossover_weights.choose(rng);
                let (c1, c2) = op.apply(&p1.genome, &p2.genome, rng);
                offspring.push(Individual::new(c1));
                offspring.push(Individual::new(c2));
            }
            _ => offspring.extend(pair.iter().cloned()),
        }
    }
    offspring
}

/// Mutates each offspring independently with the configured chance.
fn mutate<G: Gene, R: Rng>(
    offspring: &mut [Individual<G>],
    config: &GaConfig,
    rng: &mut R,
) {
    for child in offspring.iter_mut() {
        if rng.random_range(0..100) < config.mutation_chance {
            let op = config.mutation_weights.choose(rng);
            child.genome = op.apply(&child.genome, rng);
        }
    }
}

/// Writes offspring over the weakest slots, from the back of the sorted
/// population forward.
///
/// Offspring `i` targets slot `len - 1 - i`. When its genome already lives
/// in the population it is dropped and that slot keeps its current
/// occupant. Returns the number of slots overwritten.
fn replace_weakest<G: Gene>(
    population: &mut Population<G>,
    offspring: Vec<Individual<G>>,
) -> usize {
    let len = population.len();
    let mut replaced = 0;
    for (i, child) in offspring.into_iter().enumerate().take(len) {
        if population.contains(&child.genome) {
            continue;
        }
        population.replace(len - 1 - i, child);
        replaced += 1;
    }
    replaced
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{Crossover, GenomeKind, Mutation, OperatorWeights, Score, Selection};
    use crate::random::{random_permutation, random_sequence};
    use std::cell::RefCell;

    // ---- Sorting problem: minimize displaced elements ----

    struct SortProblem {
        n: usize,
    }

    impl GaProblem for SortProblem {
        type Gene = usize;

        fn genome_kind(&self) -> GenomeKind {
            GenomeKind::Permutation
        }

        fn genome_len(&self) -> usize {
            self.n
        }

        fn random_genome<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
            random_permutation(self.n, rng)
        }

        fn evaluate(&self, genome: &[usize]) -> Score {
            let displaced = genome.iter().enumerate().filter(|(i, g)| i != *g).count();
            Score::from_cost(displaced as f64 + 1.0)
        }
    }

    // ---- OneMax over bits ----

    struct OneMax {
        n: usize,
        records: RefCell<Vec<GenerationRecord>>,
    }

    impl GaProblem for OneMax {
        type Gene = bool;

        fn genome_kind(&self) -> GenomeKind {
            GenomeKind::Categorical { alphabet_size: 2 }
        }

        fn genome_len(&self) -> usize {
            self.n
        }

        fn random_genome<R: Rng>(&self, rng: &mut R) -> Vec<bool> {
            random_sequence(&[false, true], self.n, rng)
        }

        fn evaluate(&self, genome: &[bool]) -> Score {
            Score::from_payoff(genome.iter().filter(|&&b| b).count() as f64)
        }

        fn on_generation(&self, record: &GenerationRecord) {
            self.records.borrow_mut().push(*record);
        }
    }

    fn one_max(n: usize) -> OneMax {
        OneMax {
            n,
            records: RefCell::new(Vec::new()),
        }
    }

    fn permutation_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(40)
            .with_max_generations(150)
            .with_early_stop(0)
            .with_crossover_weights(
                OperatorWeights::new(vec![(Crossover::Order, 50), (Crossover::PartialMapped, 50)])
                    .unwrap(),
            )
            .with_mutation_weights(
                OperatorWeights::new(vec![
                    (Mutation::Swap, 40),
                    (Mutation::Scramble, 20),
                    (Mutation::Inversion, 40),
                ])
                .unwrap(),
            )
            .with_mutation_chance(40)
            .with_seed(42)
    }

    #[test]
    fn test_sort_problem_improves() {
        let problem = SortProblem { n: 10 };
        let result = GaRunner::run(&problem, &permutation_config()).unwrap();

        let first = result.history.first().unwrap().best_objective;
        assert!(result.best.objective <= first);
        assert!(
            result.best.objective <= 6.0,
            "expected at most 5 displaced elements, got objective {}",
            result.best.objective
        );
        let mut genome = result.best.genome.clone();
        genome.sort_unstable();
        assert_eq!(genome, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_history() {
        let problem = SortProblem { n: 12 };
        let config = permutation_config().with_max_generations(40);
        let a = GaRunner::run(&problem, &config).unwrap();
        let b = GaRunner::run(&problem, &config).unwrap();
        assert_eq!(a.history, b.history);
        assert_eq!(a.best.genome, b.best.genome);
    }

    #[test]
    fn test_elitism_monotone() {
        let problem = SortProblem { n: 15 };
        let config = permutation_config()
            .with_elite_count(2)
            .with_selection(Selection::Roulette);
        let result = GaRunner::run(&problem, &config).unwrap();

        for window in result.history.windows(2) {
            assert!(
                window[1].best_objective <= window[0].best_objective,
                "best objective regressed: {} -> {}",
                window[0].best_objective,
                window[1].best_objective
            );
        }
    }

    #[test]
    fn test_history_length_without_early_stop() {
        let problem = one_max(16);
        let config = GaConfig::strategy()
            .with_population_size(20)
            .with_max_generations(30)
            .with_seed(1);
        let result = GaRunner::run(&problem, &config).unwrap();
        assert_eq!(result.generations, 30);
        assert_eq!(result.history.len(), 30);
        assert_eq!(result.stop_reason, StopReason::MaxGenerations);
        assert_eq!(
            result.history.iter().map(|r| r.generation).collect::<Vec<_>>(),
            (1..=30).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_on_generation_sees_every_record() {
        let problem = one_max(16);
        let config = GaConfig::strategy()
            .with_population_size(20)
            .with_max_generations(12)
            .with_seed(5);
        let result = GaRunner::run(&problem, &config).unwrap();
        assert_eq!(*problem.records.borrow(), result.history);
    }

    #[test]
    fn test_onemax_converges() {
        let problem = one_max(20);
        let config = GaConfig::strategy()
            .with_population_size(50)
            .with_max_generations(200)
            .with_mutation_chance(30)
            .with_seed(42);
        let result = GaRunner::run(&problem, &config).unwrap();
        assert!(
            result.best.fitness >= 15.0,
            "expected at least 15 true bits, got {}",
            result.best.fitness
        );
    }

    #[test]
    fn test_elites_restored_when_offspring_reach_their_slots() {
        // Population 10 with 8 offspring: slots 9..2 are targeted, so the
        // third elite slot is overwritten before restoration.
        let problem = one_max(16);
        let config = GaConfig::strategy()
            .with_crossover_chance(100)
            .with_mutation_chance(100);
        assert_eq!(config.parent_count(), 8);

        let mut full_rounds = 0;
        for seed in 0..20 {
            let mut rng = create_rng(seed);
            let mut population =
                initial_population(&problem, config.population_size, &mut rng).unwrap();
            population.sort_by_fitness();
            let elites: Vec<Vec<bool>> = population.members()[..config.elite_count]
                .iter()
                .map(|ind| ind.genome.clone())
                .collect();
            let best_before = population.best().fitness;

            let replaced = next_generation(&problem, &mut population, &config, &mut rng).unwrap();
            if replaced == config.parent_count() {
                full_rounds += 1;
            }

            let slots: Vec<Vec<bool>> = population.members()[..config.elite_count]
                .iter()
                .map(|ind| ind.genome.clone())
                .collect();
            assert_eq!(slots, elites, "seed {seed}: elites not restored");
            assert_eq!(population.len(), 10);
            assert_eq!(population.distinct(), 10);

            population.sort_by_fitness();
            assert!(population.best().fitness >= best_before);
        }
        assert!(full_rounds > 0, "no round wrote into an elite slot");
    }

    #[test]
    fn test_elitism_monotone_when_offspring_overlap_elites() {
        let problem = one_max(16);
        for seed in 0..10 {
            let config = GaConfig::strategy()
                .with_population_size(5)
                .with_elite_count(4)
                .with_max_generations(60)
                .with_seed(seed);
            let result = GaRunner::run(&problem, &config).unwrap();
            for window in result.history.windows(2) {
                assert!(
                    window[1].best_objective <= window[0].best_objective,
                    "seed {seed}: best objective regressed: {} -> {}",
                    window[0].best_objective,
                    window[1].best_objective
                );
            }
        }
    }

    #[test]
    fn test_population_stays_distinct() {
        let problem = SortProblem { n: 6 };
        let config = permutation_config()
            .with_population_size(30)
            .with_max_generations(60);
        let mut rng = create_rng(3);
        let mut population = initial_population(&problem, 30, &mut rng).unwrap();
        assert_eq!(population.distinct(), 30);

        // One full replacement round keeps the length and never adds a duplicate.
        population.sort_by_fitness();
        let picks = config
            .selection
            .select(population.members(), config.parent_count(), &mut rng)
            .unwrap();
        let mut parents: Vec<_> = picks
            .into_iter()
            .map(|i| population.members()[i].clone())
            .collect();
        let mut offspring = recombine(&mut parents, &config, &mut rng);
        mutate(&mut offspring, &config, &mut rng);
        for child in &mut offspring {
            child.set_score(problem.evaluate(&child.genome));
        }
        replace_weakest(&mut population, offspring);
        assert_eq!(population.len(), 30);
        assert_eq!(population.distinct(), 30);
    }

    #[test]
    fn test_replace_weakest_skips_duplicates_in_place() {
        let ind = |g: Vec<usize>, f: f64| {
            Individual::with_score(g, Score { objective: -f, fitness: f })
        };
        let mut population = Population::new(vec![
            ind(vec![0, 1, 2], 3.0),
            ind(vec![0, 2, 1], 2.0),
            ind(vec![1, 0, 2], 1.0),
        ]);
        let offspring = vec![
            ind(vec![0, 1, 2], 9.0), // duplicate, slot 2 keeps [1, 0, 2]
            ind(vec![2, 1, 0], 9.0), // lands in slot 1
        ];
        let replaced = replace_weakest(&mut population, offspring);
        assert_eq!(replaced, 1);
        let genomes: Vec<_> = population.members().iter().map(|i| i.genome.clone()).collect();
        assert_eq!(genomes, vec![vec![0, 1, 2], vec![2, 1, 0], vec![1, 0, 2]]);
    }

    #[test]
    fn test_recombine_without_crossover_passes_parents_through() {
        let config = GaConfig::default().with_crossover_chance(0);
        let mut rng = create_rng(8);
        let mut parents: Vec<Individual<usize>> = (0..5)
            .map(|i| Individual::with_score(vec![i], Score::from_cost(1.0 + i as f64)))
            .collect();
        let offspring = recombine(&mut parents, &config, &mut rng);
        assert_eq!(offspring.len(), 5);
        let mut genomes: Vec<usize> = offspring.iter().map(|i| i.genome[0]).collect();
        genomes.sort_unstable();
        assert_eq!(genomes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_recombine_odd_parent_passes_through() {
        let config = GaConfig::default()
            .with_crossover_chance(100)
            .with_crossover_weights(OperatorWeights::single(Crossover::Order));
        let mut rng = create_rng(8);
        let mut parents: Vec<Individual<usize>> = (0..3)
            .map(|i| Individual::new(random_permutation(6, &mut create_rng(i))))
            .collect();
        let offspring = recombine(&mut parents, &config, &mut rng);
        assert_eq!(offspring.len(), 3);
        // The last shuffled parent is carried over with its genome intact.
        assert_eq!(offspring[2].genome, parents[2].genome);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_running() {
        struct Counting {
            evaluations: RefCell<usize>,
        }
        impl GaProblem for Counting {
            type Gene = usize;
            fn genome_kind(&self) -> GenomeKind {
                GenomeKind::Permutation
            }
            fn genome_len(&self) -> usize {
                8
            }
            fn random_genome<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
                random_permutation(8, rng)
            }
            fn evaluate(&self, _genome: &[usize]) -> Score {
                *self.evaluations.borrow_mut() += 1;
                Score::from_cost(1.0)
            }
        }

        let problem = Counting {
            evaluations: RefCell::new(0),
        };
        let config = GaConfig::default()
            .with_crossover_weights(OperatorWeights::single(Crossover::SinglePoint));
        let err = GaRunner::run(&problem, &config).unwrap_err();
        assert!(matches!(err, GaError::Config { field: "crossover_weights", .. }));
        assert_eq!(*problem.evaluations.borrow(), 0);
    }

    #[test]
    fn test_roulette_zero_fitness_aborts_run() {
        struct Flat;
        impl GaProblem for Flat {
            type Gene = usize;
            fn genome_kind(&self) -> GenomeKind {
                GenomeKind::Permutation
            }
            fn genome_len(&self) -> usize {
                6
            }
            fn random_genome<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
                random_permutation(6, rng)
            }
            fn evaluate(&self, _genome: &[usize]) -> Score {
                Score {
                    objective: 0.0,
                    fitness: 0.0,
                }
            }
        }

        let config = GaConfig::default()
            .with_population_size(10)
            .with_selection(Selection::Roulette)
            .with_seed(1);
        let err = GaRunner::run(&Flat, &config).unwrap_err();
        assert!(matches!(err, GaError::DegenerateFitness { .. }));
    }

    #[test]
    fn test_time_limit_stops_run() {
        let problem = SortProblem { n: 30 };
        let config = permutation_config()
            .with_max_generations(usize::MAX)
            .with_time_limit_ms(20);
        let result = GaRunner::run(&problem, &config).unwrap();
        assert_eq!(result.stop_reason, StopReason::TimeLimit);
        assert!(result.generations < usize::MAX);
    }
}
