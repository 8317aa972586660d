//! Forward and backward passes in log-space.

use crate::error::{HmmError, Result};
use crate::model::{HmmModel, LogTables};
use crate::utils::log_sum_exp;

/// `alpha[t][i]` = ln P(o_0..o_t, state_t = i). Returns `(alpha, ln P(O))`.
///
/// Observations must already be validated.
pub(crate) fn forward_pass(tables: &LogTables, observations: &[usize]) -> (Vec<Vec<f64>>, f64) {
    let n = tables.n_states;
    let t_len = observations.len();
    let mut alpha = vec![vec![f64::NEG_INFINITY; n]; t_len];

    let o0 = observations[0];
    for (i, a) in alpha[0].iter_mut().enumerate() {
        *a = tables.log_initial[i] + tables.log_emission[i][o0];
    }

    for t in 1..t_len {
        let ot = observations[t];
        let (done, rest) = alpha.split_at_mut(t);
        let prev = &done[t - 1];
        for (to, a) in rest[0].iter_mut().enumerate() {
            let row = &tables.log_transition[to];
            let incoming = log_sum_exp(prev.iter().zip(row).map(|(&p, &lt)| p + lt));
            *a = incoming + tables.log_emission[to][ot];
        }
    }

    let ll = log_sum_exp(alpha[t_len - 1].iter().copied());
    (alpha, ll)
}

/// `beta[t][i]` = ln P(o_{t+1}..o_{T-1} | state_t = i), with `beta[T-1] = 0`.
pub(crate) fn backward_pass(tables: &LogTables, observations: &[usize]) -> Vec<Vec<f64>> {
    let n = tables.n_states;
    let t_len = observations.len();
    let mut beta = vec![vec![f64::NEG_INFINITY; n]; t_len];
    beta[t_len - 1].iter_mut().for_each(|b| *b = 0.0);

    for t in (0..t_len - 1).rev() {
        let next_sym = observations[t + 1];
        let (head, tail) = beta.split_at_mut(t + 1);
        let next = &tail[0];
        for (from, b) in head[t].iter_mut().enumerate() {
            *b = log_sum_exp((0..n).map(|to| {
                tables.log_transition[to][from] + tables.log_emission[to][next_sym] + next[to]
            }));
        }
    }
    beta
}

/// Posterior state probabilities `gamma[t][i]` from matching passes.
pub(crate) fn occupancy(alpha: &[Vec<f64>], beta: &[Vec<f64>], ll: f64) -> Vec<Vec<f64>> {
    alpha
        .iter()
        .zip(beta)
        .map(|(a_t, b_t)| {
            a_t.iter()
                .zip(b_t)
                .map(|(&a, &b)| (a + b - ll).exp())
                .collect()
        })
        .collect()
}

pub(crate) fn check_log_likelihood(ll: f64) -> Result<f64> {
    if ll.is_nan() {
        return Err(HmmError::NumericInstability(
            "log-likelihood evaluated to NaN".into(),
        ));
    }
    Ok(ll)
}

impl HmmModel {
    /// Run the forward algorithm.
    ///
    /// Returns `(alpha, log_likelihood)` where `alpha[t][i]` is the log
    /// probability of observing `o_0..o_t` and being in state `i` at `t`.
    ///
    /// # Errors
    /// [`HmmError::EmptySequence`] for an empty input,
    /// [`HmmError::InvalidParameters`] for symbols outside the alphabet.
    pub fn forward(&self, observations: &[usize]) -> Result<(Vec<Vec<f64>>, f64)> {
        self.validate_observations(observations)?;
        let (alpha, ll) = forward_pass(&self.log_tables(), observations);
        Ok((alpha, check_log_likelihood(ll)?))
    }

    /// Run the backward algorithm; `beta[t][i]` is the log probability of
    /// `o_{t+1}..o_{T-1}` given state `i` at `t`.
    pub fn backward(&self, observations: &[usize]) -> Result<Vec<Vec<f64>>> {
        self.validate_observations(observations)?;
        Ok(backward_pass(&self.log_tables(), observations))
    }

    /// Natural log of P(observations | model), marginalized over all state
    /// paths.
    ///
    /// A sequence the model cannot produce yields `f64::NEG_INFINITY`.
    pub fn log_likelihood(&self, observations: &[usize]) -> Result<f64> {
        self.forward(observations).map(|(_, ll)| ll)
    }

    /// Posterior probability of each state at each time step given the whole
    /// sequence (forward-backward smoothing). Every row sums to one.
    ///
    /// # Errors
    /// Besides input validation, [`HmmError::NumericInstability`] when the
    /// sequence has zero probability under the model.
    pub fn posterior(&self, observations: &[usize]) -> Result<Vec<Vec<f64>>> {
        self.validate_observations(observations)?;
        let tables = self.log_tables();
        let (alpha, ll) = forward_pass(&tables, observations);
        if !check_log_likelihood(ll)?.is_finite() {
            return Err(HmmError::NumericInstability(
                "sequence has zero probability under the model".into(),
            ));
        }
        let beta = backward_pass(&tables, observations);
        Ok(occupancy(&alpha, &beta, ll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::log_sum_exp;

    fn demo() -> HmmModel {
        HmmModel::from_rows(
            vec![0.5, 0.5],
            vec![vec![0.8, 0.3], vec![0.2, 0.7]],
            vec![vec![0.9, 0.1], vec![0.2, 0.8]],
        )
        .unwrap()
    }

    #[test]
    fn demo_log_likelihood_is_pinned() {
        let ll = demo().log_likelihood(&[0, 0, 1, 0, 1, 1]).unwrap();
        assert!((ll - (-4.762889508519575)).abs() < 1e-12, "ll = {ll}");
    }

    #[test]
    fn first_alpha_column_matches_direct_product() {
        let (alpha, _) = demo().forward(&[0, 0]).unwrap();
        assert!((alpha[0][0] - 0.45f64.ln()).abs() < 1e-12);
        assert!((alpha[0][1] - 0.1f64.ln()).abs() < 1e-12);
        // alpha[1][0] = 0.9 * (0.8 * 0.45 + 0.3 * 0.1)
        assert!((alpha[1][0] - 0.351f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn forward_and_backward_agree_at_every_step() {
        let model = demo();
        let obs = [0, 1, 1, 0, 0, 1, 0];
        let (alpha, ll) = model.forward(&obs).unwrap();
        let beta = model.backward(&obs).unwrap();
        for t in 0..obs.len() {
            let at_t = log_sum_exp((0..2).map(|i| alpha[t][i] + beta[t][i]));
            assert!((at_t - ll).abs() < 1e-9, "t={t}: {at_t} vs {ll}");
        }
    }

    #[test]
    fn posterior_rows_are_distributions() {
        let gamma = demo().posterior(&[0, 0, 1, 0, 1, 1]).unwrap();
        assert_eq!(gamma.len(), 6);
        for row in &gamma {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn impossible_sequence_scores_negative_infinity() {
        let model = HmmModel::from_rows(
            vec![1.0, 0.0],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap();
        assert_eq!(model.log_likelihood(&[0, 1]).unwrap(), f64::NEG_INFINITY);
        assert!(matches!(
            model.posterior(&[0, 1]),
            Err(HmmError::NumericInstability(_))
        ));
    }

    #[test]
    fn long_sequences_do_not_underflow() {
        let obs: Vec<usize> = (0..5_000).map(|t| (t / 3) % 2).collect();
        let ll = demo().log_likelihood(&obs).unwrap();
        assert!(ll.is_finite());
        assert!(ll < -1000.0);
    }
}
