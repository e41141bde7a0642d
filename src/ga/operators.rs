//! Crossover and mutation operators.
//!
//! Every operator is pure: it borrows its parents and returns freshly
//! allocated offspring, so retained elites can never be altered through
//! an alias.
//!
//! # Crossover Operators
//!
//! - [`order_crossover`] (OX): Davis (1985), preserves relative order
//! - [`pmx_crossover`] (PMX): Goldberg & Lingle (1985), preserves absolute position
//! - [`single_point_crossover`]: prefix/suffix exchange for categorical genomes
//!
//! # Mutation Operators
//!
//! - [`swap_mutation`]: exchange two distinct positions
//! - [`scramble_mutation`]: shuffle a random segment
//! - [`inversion_mutation`]: reverse a random segment (2-opt move)
//!
//! Segments are half-open `[start, end)` with `0 <= start <= end <= n`.
//! An empty segment is legal and handled by the general algorithms.
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"

use super::types::{Gene, GenomeKind};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use std::collections::{HashMap, HashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Variants
// ============================================================================

/// Crossover algorithm variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Crossover {
    /// Order crossover, permutation genomes only.
    Order,
    /// Partial-mapped crossover, permutation genomes only.
    PartialMapped,
    /// Single-point crossover, categorical genomes only.
    SinglePoint,
}

impl Crossover {
    /// Whether this variant keeps genomes of `kind` valid.
    pub fn supports(&self, kind: GenomeKind) -> bool {
        match self {
            Crossover::Order | Crossover::PartialMapped => kind == GenomeKind::Permutation,
            Crossover::SinglePoint => matches!(kind, GenomeKind::Categorical { .. }),
        }
    }

    /// Recombines two parents into two children.
    ///
    /// # Panics
    /// Panics if the parents have different lengths.
    pub fn apply<G: Gene, R: Rng>(
        &self,
        parent1: &[G],
        parent2: &[G],
        rng: &mut R,
    ) -> (Vec<G>, Vec<G>) {
        match self {
            Crossover::Order => order_crossover(parent1, parent2, rng),
            Crossover::PartialMapped => pmx_crossover(parent1, parent2, rng),
            Crossover::SinglePoint => single_point_crossover(parent1, parent2, rng),
        }
    }
}

/// Mutation algorithm variants. All of them only rearrange existing
/// symbols, so they are valid for both genome kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mutation {
    /// Exchanges two distinct loci.
    Swap,
    /// Shuffles the symbols inside a random segment.
    Scramble,
    /// Reverses a random segment.
    Inversion,
}

impl Mutation {
    /// Returns a mutated copy of `genome`.
    pub fn apply<G: Gene, R: Rng>(&self, genome: &[G], rng: &mut R) -> Vec<G> {
        match self {
            Mutation::Swap => swap_mutation(genome, rng),
            Mutation::Scramble => scramble_mutation(genome, rng),
            Mutation::Inversion => inversion_mutation(genome, rng),
        }
    }
}

// ============================================================================
// Crossover operators
// ============================================================================

/// Order Crossover (OX) for permutations.
///
/// # Algorithm
///
/// 1. Select a random segment `[start, end)`
/// 2. Copy `parent1[start..end]` into child1 at the same positions
/// 3. Fill the remaining positions left to right with the symbols of
///    `parent2` in `parent2`'s order, skipping those already copied
///
/// child2 is built symmetrically with the parents' roles swapped.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn order_crossover<G: Gene, R: Rng>(
    parent1: &[G],
    parent2: &[G],
    rng: &mut R,
) -> (Vec<G>, Vec<G>) {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");
    let (start, end) = random_segment(parent1.len(), rng);
    order_crossover_at(parent1, parent2, start, end)
}

/// [`order_crossover`] with fixed cut points.
///
/// # Panics
/// Panics if the parents have different lengths or `start > end` or
/// `end > len`.
pub fn order_crossover_at<G: Gene>(
    parent1: &[G],
    parent2: &[G],
    start: usize,
    end: usize,
) -> (Vec<G>, Vec<G>) {
    check_segment(parent1, parent2, start, end);
    (
        ox_build_child(parent1, parent2, start, end),
        ox_build_child(parent2, parent1, start, end),
    )
}

/// Build one OX child: copy segment from `template`, fill from `donor`.
fn ox_build_child<G: Gene>(template: &[G], donor: &[G], start: usize, end: usize) -> Vec<G> {
    let segment = &template[start..end];
    let in_segment: HashSet<G> = segment.iter().copied().collect();

    let mut fill = donor.iter().copied().filter(|g| !in_segment.contains(g));
    let mut child = Vec::with_capacity(template.len());
    for i in 0..template.len() {
        if (start..end).contains(&i) {
            child.push(template[i]);
        } else {
            // A short fill means the parents are not permutations of each other.
            let gene = fill
                .next()
                .expect("parents must be permutations of the same symbols");
            child.push(gene);
        }
    }
    child
}

/// Partially Mapped Crossover (PMX) for permutations.
///
/// # Algorithm
///
/// 1. Select a random segment `[start, end)`
/// 2. Swap the segment between the parents to form the initial children
/// 3. Record the mapping `parent2[i] -> parent1[i]` (child1) and
///    `parent1[i] -> parent2[i]` (child2) for every `i` in the segment
/// 4. Outside the segment, follow the child's mapping until reaching a
///    symbol that is not a key, and write that symbol
///
/// # Complexity
/// O(n) expected time, O(n) space
///
/// # Panics
/// Panics if the parents have different lengths, or if a mapping chain
/// does not terminate (parents are not permutations of the same symbols).
pub fn pmx_crossover<G: Gene, R: Rng>(
    parent1: &[G],
    parent2: &[G],
    rng: &mut R,
) -> (Vec<G>, Vec<G>) {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");
    let (start, end) = random_segment(parent1.len(), rng);
    pmx_crossover_at(parent1, parent2, start, end)
}

/// [`pmx_crossover`] with fixed cut points.
///
/// # Panics
/// Same as [`order_crossover_at`], plus non-terminating mapping chains.
pub fn pmx_crossover_at<G: Gene>(
    parent1: &[G],
    parent2: &[G],
    start: usize,
    end: usize,
) -> (Vec<G>, Vec<G>) {
    check_segment(parent1, parent2, start, end);
    (
        pmx_build_child(parent1, parent2, start, end),
        pmx_build_child(parent2, parent1, start, end),
    )
}

/// Build one PMX child: keep `base` outside the segment, take `donor`'s
/// segment, and repair the outside through the donor-to-base mapping.
fn pmx_build_child<G: Gene>(base: &[G], donor: &[G], start: usize, end: usize) -> Vec<G> {
    let n = base.len();
    let mapping: HashMap<G, G> = (start..end).map(|i| (donor[i], base[i])).collect();

    let mut child = base.to_vec();
    child[start..end].copy_from_slice(&donor[start..end]);

    for i in (0..start).chain(end..n) {
        let mut gene = child[i];
        let mut steps = 0;
        while let Some(&mapped) = mapping.get(&gene) {
            gene = mapped;
            steps += 1;
            assert!(steps <= n, "parents must be permutations of the same symbols");
        }
        child[i] = gene;
    }
    child
}

/// Single-point crossover for categorical genomes.
///
/// Picks a cut in `1..n`; child1 takes `parent1`'s prefix and `parent2`'s
/// suffix, child2 the reverse. Genomes shorter than 2 are returned as copies.
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn single_point_crossover<G: Gene, R: Rng>(
    parent1: &[G],
    parent2: &[G],
    rng: &mut R,
) -> (Vec<G>, Vec<G>) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    if n < 2 {
        return (parent1.to_vec(), parent2.to_vec());
    }
    let cut = rng.random_range(1..n);
    single_point_crossover_at(parent1, parent2, cut)
}

/// [`single_point_crossover`] with a fixed cut.
///
/// # Panics
/// Panics if the parents have different lengths or `cut > len`.
pub fn single_point_crossover_at<G: Gene>(
    parent1: &[G],
    parent2: &[G],
    cut: usize,
) -> (Vec<G>, Vec<G>) {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");
    assert!(cut <= parent1.len(), "cut point out of range");

    let child1 = [&parent1[..cut], &parent2[cut..]].concat();
    let child2 = [&parent2[..cut], &parent1[cut..]].concat();
    (child1, child2)
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Swap mutation: exchange the symbols at two distinct random positions.
///
/// # Complexity
/// O(n) for the copy, O(1) for the move
pub fn swap_mutation<G: Gene, R: Rng>(genome: &[G], rng: &mut R) -> Vec<G> {
    let mut out = genome.to_vec();
    if out.len() < 2 {
        return out;
    }
    let picks = index::sample(rng, out.len(), 2);
    out.swap(picks.index(0), picks.index(1));
    out
}

/// Scramble mutation: uniformly shuffle a random segment.
pub fn scramble_mutation<G: Gene, R: Rng>(genome: &[G], rng: &mut R) -> Vec<G> {
    let mut out = genome.to_vec();
    if out.len() < 2 {
        return out;
    }
    let (start, end) = random_segment(out.len(), rng);
    out[start..end].shuffle(rng);
    out
}

/// Inversion mutation: reverse a random segment.
pub fn inversion_mutation<G: Gene, R: Rng>(genome: &[G], rng: &mut R) -> Vec<G> {
    let mut out = genome.to_vec();
    if out.len() < 2 {
        return out;
    }
    let (start, end) = random_segment(out.len(), rng);
    out[start..end].reverse();
    out
}

// ============================================================================
// Helpers
// ============================================================================

/// Pick a random half-open segment `[start, end)` with `start <= end <= n`.
fn random_segment<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..=n);
    let b = rng.random_range(0..=n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn check_segment<G>(parent1: &[G], parent2: &[G], start: usize, end: usize) {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");
    assert!(
        start <= end && end <= parent1.len(),
        "invalid segment [{start}, {end}) for length {}",
        parent1.len()
    );
}

// ============================================================================
// Tests
// ============================================================================
