//! Viterbi decoding.
//!
//! Ties between equally likely predecessors, and between equally likely final
//! states, resolve to the lowest state index. The recurrence scans states in
//! increasing order and only replaces the running best on a strictly greater
//! score, so the result is deterministic for any input.

use crate::error::Result;
use crate::model::{HmmModel, LogTables};
use crate::utils::argmax_lowest;

/// Returns the best path and its log probability. Observations must already be
/// validated.
pub(crate) fn viterbi_pass(tables: &LogTables, observations: &[usize]) -> (Vec<usize>, f64) {
    let n = tables.n_states;
    let t_len = observations.len();

    // psi[t][i]: best predecessor of state i at time t (psi[0] unused).
    let mut psi = vec![vec![0usize; n]; t_len];
    let o0 = observations[0];
    let mut delta: Vec<f64> = (0..n)
        .map(|i| tables.log_initial[i] + tables.log_emission[i][o0])
        .collect();
    let mut next = vec![f64::NEG_INFINITY; n];
    let mut scratch = vec![f64::NEG_INFINITY; n];

    for t in 1..t_len {
        let ot = observations[t];
        for (to, slot) in next.iter_mut().enumerate() {
            let row = &tables.log_transition[to];
            for (from, s) in scratch.iter_mut().enumerate() {
                *s = delta[from] + row[from];
            }
            let (best_from, best) = argmax_lowest(&scratch);
            psi[t][to] = best_from;
            *slot = best + tables.log_emission[to][ot];
        }
        std::mem::swap(&mut delta, &mut next);
    }

    let (mut state, best) = argmax_lowest(&delta);
    let mut path = vec![0usize; t_len];
    path[t_len - 1] = state;
    for t in (1..t_len).rev() {
        state = psi[t][state];
        path[t - 1] = state;
    }
    (path, best)
}

impl HmmModel {
    /// Most likely hidden-state path for `observations`.
    ///
    /// # Errors
    /// [`crate::HmmError::EmptySequence`] for an empty input,
    /// [`crate::HmmError::InvalidParameters`] for symbols outside the alphabet.
    pub fn predict(&self, observations: &[usize]) -> Result<Vec<usize>> {
        self.viterbi(observations).map(|(path, _)| path)
    }

    /// Like [`predict`](Self::predict), also returning the log probability of
    /// the decoded path (`-inf` if no path can produce the sequence).
    pub fn viterbi(&self, observations: &[usize]) -> Result<(Vec<usize>, f64)> {
        self.validate_observations(observations)?;
        Ok(viterbi_pass(&self.log_tables(), observations))
    }
}
