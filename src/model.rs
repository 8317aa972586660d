//! Model parameters and their validation.
//!
//! An [`HmmModel`] owns three parameter sets:
//! - `initial[i]`: P(state `i` at t = 0),
//! - `transition[to][from]`: P(next state `to` | current state `from`); every
//!   *column* sums to one,
//! - `emission[i]`: a [`DiscreteDistribution`] over the observation symbols.
//!
//! Parameters are stored as probabilities. The algorithms work on a log-space
//! copy ([`LogTables`]) built at the start of each call.

use crate::distribution::{check_probability_vector, DiscreteDistribution};
use crate::error::{HmmError, Result};
use crate::utils::PROBABILITY_TOLERANCE;
use std::fmt;

/// A discrete hidden Markov model.
#[derive(Clone, Debug, PartialEq)]
pub struct HmmModel {
    n_states: usize,
    n_symbols: usize,
    initial: Vec<f64>,
    /// `transition[to][from]`, column-stochastic.
    transition: Vec<Vec<f64>>,
    emission: Vec<DiscreteDistribution>,
}

/// Natural-log copies of the model parameters, same indexing as the model.
#[derive(Clone, Debug)]
pub(crate) struct LogTables {
    pub n_states: usize,
    pub log_initial: Vec<f64>,
    /// `log_transition[to][from]`
    pub log_transition: Vec<Vec<f64>>,
    /// `log_emission[state][symbol]`
    pub log_emission: Vec<Vec<f64>>,
}

impl HmmModel {
    /// Construct a model, validating shapes and stochastic constraints.
    ///
    /// # Errors
    /// [`HmmError::InvalidParameters`] naming the violated constraint when
    /// - there are no states, or the emission rows cover no symbols,
    /// - `transition` is not `n_states × n_states`, `emission` does not have
    ///   one row per state, or emission rows disagree on the alphabet size,
    /// - any probability is negative or not finite,
    /// - `initial`, a transition column, or an emission row does not sum to
    ///   one within `1e-6`.
    ///
    /// Inputs are never renormalized.
    pub fn new(
        initial: Vec<f64>,
        transition: Vec<Vec<f64>>,
        emission: Vec<DiscreteDistribution>,
    ) -> Result<Self> {
        let n_states = initial.len();
        if n_states == 0 {
            return Err(HmmError::InvalidParameters(
                "model needs at least one state".into(),
            ));
        }
        if transition.len() != n_states {
            return Err(HmmError::InvalidParameters(format!(
                "transition has {} rows, expected {n_states}",
                transition.len()
            )));
        }
        for (to, row) in transition.iter().enumerate() {
            if row.len() != n_states {
                return Err(HmmError::InvalidParameters(format!(
                    "transition row {to} has {} columns, expected {n_states}",
                    row.len()
                )));
            }
        }
        if emission.len() != n_states {
            return Err(HmmError::InvalidParameters(format!(
                "{} emission distributions for {n_states} states",
                emission.len()
            )));
        }
        let n_symbols = emission[0].n_symbols();
        if n_symbols == 0 {
            return Err(HmmError::InvalidParameters(
                "emission distributions must cover at least one symbol".into(),
            ));
        }
        for (state, dist) in emission.iter().enumerate() {
            if dist.n_symbols() != n_symbols {
                return Err(HmmError::InvalidParameters(format!(
                    "emission row {state} covers {} symbols, expected {n_symbols}",
                    dist.n_symbols()
                )));
            }
        }

        check_probability_vector("initial", &initial)?;
        check_columns(&transition)?;
        for (state, dist) in emission.iter().enumerate() {
            check_probability_vector(&format!("emission row {state}"), dist.probabilities())?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(n_states, n_symbols, "constructed hmm");

        Ok(Self {
            n_states,
            n_symbols,
            initial,
            transition,
            emission,
        })
    }

    /// Like [`HmmModel::new`], taking emission rows as plain vectors.
    pub fn from_rows(
        initial: Vec<f64>,
        transition: Vec<Vec<f64>>,
        emission: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let emission = emission
            .into_iter()
            .map(DiscreteDistribution::from_raw)
            .collect();
        Self::new(initial, transition, emission)
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    /// Initial state probabilities.
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// Transition matrix, `transition()[to][from]`.
    pub fn transition(&self) -> &[Vec<f64>] {
        &self.transition
    }

    /// Per-state emission distributions.
    pub fn emission(&self) -> &[DiscreteDistribution] {
        &self.emission
    }

    /// Reject empty sequences and symbols outside the alphabet.
    pub(crate) fn validate_observations(&self, observations: &[usize]) -> Result<()> {
        if observations.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        if let Some((t, &o)) = observations
            .iter()
            .enumerate()
            .find(|&(_, &o)| o >= self.n_symbols)
        {
            return Err(HmmError::InvalidParameters(format!(
                "observation[{t}] = {o} is outside the alphabet of {} symbols",
                self.n_symbols
            )));
        }
        Ok(())
    }

    pub(crate) fn log_tables(&self) -> LogTables {
        LogTables {
            n_states: self.n_states,
            log_initial: self.initial.iter().map(|p| p.ln()).collect(),
            log_transition: self
                .transition
                .iter()
                .map(|row| row.iter().map(|p| p.ln()).collect())
                .collect(),
            log_emission: self
                .emission
                .iter()
                .map(|d| d.probabilities().iter().map(|p| p.ln()).collect())
                .collect(),
        }
    }

    /// Replace all three parameter sets at once. Used by training after the
    /// new parameters have been checked.
    pub(crate) fn replace_parameters(
        &mut self,
        initial: Vec<f64>,
        transition: Vec<Vec<f64>>,
        emission: Vec<Vec<f64>>,
    ) {
        debug_assert_eq!(initial.len(), self.n_states);
        self.initial = initial;
        self.transition = transition;
        self.emission = emission
            .into_iter()
            .map(DiscreteDistribution::from_raw)
            .collect();
    }
}

/// Each column of a square `[to][from]` matrix must be a probability vector.
fn check_columns(transition: &[Vec<f64>]) -> Result<()> {
    let n = transition.len();
    for from in 0..n {
        let mut sum = 0.0;
        for (to, row) in transition.iter().enumerate() {
            let p = row[from];
            if !p.is_finite() || p < 0.0 {
                return Err(HmmError::InvalidParameters(format!(
                    "transition[{to}][{from}] = {p} is not a probability"
                )));
            }
            sum += p;
        }
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(HmmError::InvalidParameters(format!(
                "transition column {from} sums to {sum}, expected 1"
            )));
        }
    }
    Ok(())
}

impl fmt::Display for HmmModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Initial state probabilities:")?;
        for p in &self.initial {
            write!(f, "{p:>10.4}")?;
        }
        writeln!(f)?;
        writeln!(f, "State transition matrix:")?;
        for row in &self.transition {
            for p in row {
                write!(f, "{p:>10.4}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Emission probabilities for each state:")?;
        for (state, dist) in self.emission.iter().enumerate() {
            writeln!(f, "  State {state}: {dist}")?;
        }
        Ok(())
    }
}
