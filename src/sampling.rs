//! Drawing synthetic sequences from a model.

use crate::error::{HmmError, Result};
use crate::model::HmmModel;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

fn weighted(what: &str, weights: &[f64]) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(weights)
        .map_err(|err| HmmError::InvalidParameters(format!("cannot sample {what}: {err}")))
}

impl HmmModel {
    /// Sample a hidden-state path and the observations it emits.
    ///
    /// Returns `(states, observations)`, both of length `len`.
    ///
    /// # Errors
    /// [`HmmError::EmptySequence`] if `len == 0`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        len: usize,
    ) -> Result<(Vec<usize>, Vec<usize>)> {
        if len == 0 {
            return Err(HmmError::EmptySequence);
        }
        let n = self.n_states();
        let start = weighted("initial state", self.initial())?;
        let columns = (0..n)
            .map(|from| {
                let column: Vec<f64> = self.transition().iter().map(|row| row[from]).collect();
                weighted(&format!("transition from state {from}"), &column)
            })
            .collect::<Result<Vec<_>>>()?;
        let emitters = self
            .emission()
            .iter()
            .enumerate()
            .map(|(state, d)| weighted(&format!("emission of state {state}"), d.probabilities()))
            .collect::<Result<Vec<_>>>()?;

        let mut states = Vec::with_capacity(len);
        let mut observations = Vec::with_capacity(len);
        let mut state = start.sample(rng);
        for t in 0..len {
            if t > 0 {
                state = columns[state].sample(rng);
            }
            states.push(state);
            observations.push(emitters[state].sample(rng));
        }
        Ok((states, observations))
    }
}
