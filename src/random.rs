//! Seeded random source and genome generators.
//!
//! One generator is created per run and passed by `&mut` into every
//! operator, so successive calls draw from a single stream.

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

/// Creates a deterministic random generator from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Returns a uniformly shuffled permutation of `0..n`.
pub fn random_permutation<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}

/// Returns `n` symbols drawn independently and uniformly from `alphabet`.
///
/// # Panics
/// Panics if `alphabet` is empty and `n > 0`.
pub fn random_sequence<G: Copy, R: Rng>(alphabet: &[G], n: usize, rng: &mut R) -> Vec<G> {
    (0..n)
        .map(|_| *alphabet.choose(rng).expect("alphabet must not be empty"))
        .collect()
}
