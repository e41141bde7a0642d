//! Percentage weight tables for choosing among operator variants.

use crate::error::GaError;
use rand::Rng;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Required sum of every weight table.
pub const TOTAL_WEIGHT: u32 = 100;

/// Maps operator variants to integer weights summing to exactly 100.
///
/// Construction validates the table, so a value of this type is always
/// usable. With the `serde` feature, deserialization goes through the same
/// validation.
///
/// # Examples
///
/// ```
/// use evosearch::ga::{Crossover, OperatorWeights};
///
/// let ok = OperatorWeights::new(vec![(Crossover::Order, 60), (Crossover::PartialMapped, 40)]);
/// assert!(ok.is_ok());
///
/// let short = OperatorWeights::new(vec![(Crossover::Order, 60), (Crossover::PartialMapped, 30)]);
/// assert!(short.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "Vec<(V, u32)>",
        into = "Vec<(V, u32)>",
        bound(
            serialize = "V: Serialize + Clone",
            deserialize = "V: Deserialize<'de> + Copy + PartialEq + fmt::Debug"
        )
    )
)]
pub struct OperatorWeights<V> {
    entries: Vec<(V, u32)>,
}

impl<V: Copy + PartialEq + fmt::Debug> OperatorWeights<V> {
    /// Builds a validated table.
    ///
    /// Fails when the weights do not sum to 100 or a variant is listed twice.
    pub fn new(entries: Vec<(V, u32)>) -> Result<Self, GaError> {
        Self::validate_entries(&entries)?;
        Ok(Self { entries })
    }

    /// A table that always picks `variant`.
    pub fn single(variant: V) -> Self {
        Self {
            entries: vec![(variant, TOTAL_WEIGHT)],
        }
    }

    /// Table from weights known to be valid at compile time.
    pub(crate) fn from_static(entries: &[(V, u32)]) -> Self {
        debug_assert!(Self::validate_entries(entries).is_ok());
        Self {
            entries: entries.to_vec(),
        }
    }

    fn validate_entries(entries: &[(V, u32)]) -> Result<(), GaError> {
        for (i, (variant, _)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(v, _)| v == variant) {
                return Err(GaError::config(
                    "operator_weights",
                    format!("{variant:?} listed more than once"),
                ));
            }
        }
        let total: u32 = entries.iter().map(|(_, w)| *w).sum();
        if total != TOTAL_WEIGHT {
            return Err(GaError::config(
                "operator_weights",
                format!("weights sum to {total}, expected {TOTAL_WEIGHT}"),
            ));
        }
        Ok(())
    }

    /// Variants with a non-zero weight.
    pub fn variants(&self) -> impl Iterator<Item = V> + '_ {
        self.entries
            .iter()
            .filter(|(_, w)| *w > 0)
            .map(|(v, _)| *v)
    }

    /// The raw `(variant, weight)` pairs.
    pub fn entries(&self) -> &[(V, u32)] {
        &self.entries
    }

    /// Picks a variant with probability `weight / 100`.
    ///
    /// A table with a single enabled variant returns it without drawing
    /// from `rng`.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> V {
        let mut enabled = self.entries.iter().filter(|(_, w)| *w > 0);
        if let (Some(&(only, _)), None) = (enabled.next(), enabled.next()) {
            return only;
        }

        let roll = rng.random_range(0..TOTAL_WEIGHT);
        let mut cumulative = 0;
        for &(variant, weight) in &self.entries {
            cumulative += weight;
            if roll < cumulative {
                return variant;
            }
        }
        // Unreachable for a validated table.
        self.entries[self.entries.len() - 1].0
    }
}

impl<V: Copy + PartialEq + fmt::Debug> TryFrom<Vec<(V, u32)>> for OperatorWeights<V> {
    type Error = GaError;

    fn try_from(entries: Vec<(V, u32)>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl<V> From<OperatorWeights<V>> for Vec<(V, u32)> {
    fn from(weights: OperatorWeights<V>) -> Self {
        weights.entries
    }
}
