//! Discrete emission distributions.

use crate::error::{HmmError, Result};
use crate::utils::PROBABILITY_TOLERANCE;
use std::fmt;

/// Probability distribution over the symbols `0..n_symbols`.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteDistribution {
    probabilities: Vec<f64>,
}

impl DiscreteDistribution {
    /// Build a distribution, checking that it is non-empty, non-negative and
    /// sums to one.
    pub fn new(probabilities: Vec<f64>) -> Result<Self> {
        check_probability_vector("emission distribution", &probabilities)?;
        Ok(Self { probabilities })
    }

    /// Uniform distribution over `n_symbols` symbols.
    pub fn uniform(n_symbols: usize) -> Result<Self> {
        if n_symbols == 0 {
            return Err(HmmError::InvalidParameters(
                "emission distribution must cover at least one symbol".into(),
            ));
        }
        Ok(Self {
            probabilities: vec![1.0 / n_symbols as f64; n_symbols],
        })
    }

    /// Wrap a vector produced by re-estimation; callers guarantee validity.
    pub(crate) fn from_raw(probabilities: Vec<f64>) -> Self {
        Self { probabilities }
    }

    pub fn n_symbols(&self) -> usize {
        self.probabilities.len()
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// P(symbol). Panics if `symbol >= n_symbols()`; see [`Self::get`].
    #[inline]
    pub fn probability(&self, symbol: usize) -> f64 {
        self.probabilities[symbol]
    }

    /// P(symbol), or `None` outside the alphabet.
    #[inline]
    pub fn get(&self, symbol: usize) -> Option<f64> {
        self.probabilities.get(symbol).copied()
    }
}

impl TryFrom<Vec<f64>> for DiscreteDistribution {
    type Error = HmmError;

    fn try_from(probabilities: Vec<f64>) -> Result<Self> {
        Self::new(probabilities)
    }
}

impl fmt::Display for DiscreteDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.probabilities {
            write!(f, "{p:>10.4}")?;
        }
        Ok(())
    }
}

/// Check that `values` is a non-empty probability vector: finite,
/// non-negative, summing to one within [`PROBABILITY_TOLERANCE`].
pub(crate) fn check_probability_vector(what: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(HmmError::InvalidParameters(format!("{what} is empty")));
    }
    for (idx, &p) in values.iter().enumerate() {
        if !p.is_finite() {
            return Err(HmmError::InvalidParameters(format!(
                "{what} entry {idx} is not finite ({p})"
            )));
        }
        if p < 0.0 {
            return Err(HmmError::InvalidParameters(format!(
                "{what} entry {idx} is negative ({p})"
            )));
        }
    }
    let sum: f64 = values.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(HmmError::InvalidParameters(format!(
            "{what} sums to {sum}, expected 1"
        )));
    }
    Ok(())
}
