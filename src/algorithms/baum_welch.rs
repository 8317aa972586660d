//! Baum-Welch (EM) re-estimation.
//!
//! Each iteration runs forward-backward over every training sequence, collects
//! expected counts ([`SufficientStats`]) and replaces all parameters with their
//! normalized counts. EM never decreases the total log-likelihood, but it only
//! finds a *local* maximum: the result depends on the starting parameters.
//!
//! Training works on a copy of the model and commits it only after every
//! iteration succeeded, so a failure leaves the caller's model untouched.
//!
//! With the `parallel` feature the E-step maps sequences on the rayon pool and
//! reduces their statistics additively.

use crate::algorithms::forward::{backward_pass, check_log_likelihood, forward_pass, occupancy};
use crate::config::TrainConfig;
use crate::error::{HmmError, Result};
use crate::model::{HmmModel, LogTables};
use crate::utils::MIN_OCCUPANCY;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of a [`HmmModel::train`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainReport {
    /// Number of parameter updates applied.
    pub iterations: usize,
    /// Total log-likelihood of the training sequences under the final
    /// parameters.
    pub log_likelihood: f64,
    /// Whether training stopped on the tolerance rather than the iteration cap.
    pub converged: bool,
}

/// Expected counts gathered by the E-step. Statistics of independent
/// sequences combine with [`SufficientStats::merge`].
#[derive(Clone, Debug)]
pub(crate) struct SufficientStats {
    n_sequences: usize,
    log_likelihood: f64,
    /// Σ gamma[0][i]
    initial: Vec<f64>,
    /// Σ_t xi[t][to][from]
    transition_num: Vec<Vec<f64>>,
    /// Σ_{t < T-1} gamma[t][from]
    transition_den: Vec<f64>,
    /// Σ_{t: o_t = s} gamma[t][i]
    emission_num: Vec<Vec<f64>>,
    /// Σ_t gamma[t][i]
    emission_den: Vec<f64>,
}

impl SufficientStats {
    fn zeros(n_states: usize, n_symbols: usize) -> Self {
        Self {
            n_sequences: 0,
            log_likelihood: 0.0,
            initial: vec![0.0; n_states],
            transition_num: vec![vec![0.0; n_states]; n_states],
            transition_den: vec![0.0; n_states],
            emission_num: vec![vec![0.0; n_symbols]; n_states],
            emission_den: vec![0.0; n_states],
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.n_sequences += other.n_sequences;
        self.log_likelihood += other.log_likelihood;
        add_assign(&mut self.initial, &other.initial);
        add_assign(&mut self.transition_den, &other.transition_den);
        add_assign(&mut self.emission_den, &other.emission_den);
        for (dst, src) in self.transition_num.iter_mut().zip(&other.transition_num) {
            add_assign(dst, src);
        }
        for (dst, src) in self.emission_num.iter_mut().zip(&other.emission_num) {
            add_assign(dst, src);
        }
        self
    }
}

fn add_assign(dst: &mut [f64], src: &[f64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += s;
    }
}

/// Forward-backward over one validated sequence.
fn accumulate_sequence(
    tables: &LogTables,
    n_symbols: usize,
    index: usize,
    observations: &[usize],
) -> Result<SufficientStats> {
    let n = tables.n_states;
    let t_len = observations.len();
    let (alpha, ll) = forward_pass(tables, observations);
    if !check_log_likelihood(ll)?.is_finite() {
        return Err(HmmError::NumericInstability(format!(
            "training sequence {index} has zero probability under the current parameters"
        )));
    }
    let beta = backward_pass(tables, observations);
    let gamma = occupancy(&alpha, &beta, ll);

    let mut stats = SufficientStats::zeros(n, n_symbols);
    stats.n_sequences = 1;
    stats.log_likelihood = ll;
    stats.initial.copy_from_slice(&gamma[0]);

    for (t, (&sym, g_t)) in observations.iter().zip(&gamma).enumerate() {
        for i in 0..n {
            stats.emission_num[i][sym] += g_t[i];
            stats.emission_den[i] += g_t[i];
            if t + 1 < t_len {
                stats.transition_den[i] += g_t[i];
            }
        }
    }

    for t in 0..t_len.saturating_sub(1) {
        let next_sym = observations[t + 1];
        for to in 0..n {
            let tail = tables.log_emission[to][next_sym] + beta[t + 1][to] - ll;
            let row = &tables.log_transition[to];
            for from in 0..n {
                stats.transition_num[to][from] += (alpha[t][from] + row[from] + tail).exp();
            }
        }
    }

    Ok(stats)
}

#[cfg(not(feature = "parallel"))]
fn expectation<S: AsRef<[usize]>>(model: &HmmModel, sequences: &[S]) -> Result<SufficientStats> {
    let tables = model.log_tables();
    let n_symbols = model.n_symbols();
    sequences.iter().enumerate().try_fold(
        SufficientStats::zeros(model.n_states(), n_symbols),
        |acc, (idx, seq)| Ok(acc.merge(accumulate_sequence(&tables, n_symbols, idx, seq.as_ref())?)),
    )
}

#[cfg(feature = "parallel")]
fn expectation<S: AsRef<[usize]> + Sync>(
    model: &HmmModel,
    sequences: &[S],
) -> Result<SufficientStats> {
    let tables = model.log_tables();
    let n_states = model.n_states();
    let n_symbols = model.n_symbols();
    sequences
        .par_iter()
        .enumerate()
        .map(|(idx, seq)| accumulate_sequence(&tables, n_symbols, idx, seq.as_ref()))
        .try_reduce(
            || SufficientStats::zeros(n_states, n_symbols),
            |a, b| Ok(a.merge(b)),
        )
}

type Parameters = (Vec<f64>, Vec<Vec<f64>>, Vec<Vec<f64>>);

/// Normalize expected counts into new parameters. Columns and rows whose
/// occupancy is ~0 keep the values from `prior`.
fn maximization(prior: &HmmModel, stats: &SufficientStats) -> Result<Parameters> {
    let n = prior.n_states();
    let seqs = stats.n_sequences as f64;

    let initial: Vec<f64> = stats.initial.iter().map(|g| g / seqs).collect();

    let mut transition = prior.transition().to_vec();
    for from in 0..n {
        let den = stats.transition_den[from];
        if den < MIN_OCCUPANCY {
            continue;
        }
        for (to, row) in transition.iter_mut().enumerate() {
            row[from] = stats.transition_num[to][from] / den;
        }
    }

    let mut emission: Vec<Vec<f64>> = prior
        .emission()
        .iter()
        .map(|d| d.probabilities().to_vec())
        .collect();
    for (state, row) in emission.iter_mut().enumerate() {
        let den = stats.emission_den[state];
        if den < MIN_OCCUPANCY {
            continue;
        }
        for (p, num) in row.iter_mut().zip(&stats.emission_num[state]) {
            *p = num / den;
        }
    }

    let all_finite = initial.iter().all(|p| p.is_finite())
        && transition.iter().flatten().all(|p| p.is_finite())
        && emission.iter().flatten().all(|p| p.is_finite());
    if !all_finite {
        return Err(HmmError::NumericInstability(
            "re-estimated parameters contain non-finite values".into(),
        ));
    }

    Ok((initial, transition, emission))
}

impl HmmModel {
    /// Re-estimate all parameters from `sequences` with Baum-Welch.
    ///
    /// Runs at most `config.max_iterations` EM updates, stopping early once
    /// the total log-likelihood changes by less than `config.tolerance`
    /// between iterations. Every call starts from the current parameters.
    ///
    /// # Errors
    /// - [`HmmError::EmptySequence`] if `sequences` is empty or contains an
    ///   empty sequence,
    /// - [`HmmError::InvalidParameters`] for symbols outside the alphabet,
    /// - [`HmmError::NumericInstability`] if a sequence has zero probability
    ///   under the parameters of some iteration.
    ///
    /// On error the model is left exactly as it was.
    pub fn train<S>(&mut self, sequences: &[S], config: &TrainConfig) -> Result<TrainReport>
    where
        S: AsRef<[usize]> + Sync,
    {
        if sequences.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        for seq in sequences {
            self.validate_observations(seq.as_ref())?;
        }

        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "baum_welch",
            sequences = sequences.len(),
            max_iterations = config.max_iterations
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut working = self.clone();
        let mut prev_ll: Option<f64> = None;
        let mut final_ll: Option<f64> = None;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < config.max_iterations {
            let stats = expectation(&working, sequences)?;
            let ll = stats.log_likelihood;
            if let Some(prev) = prev_ll {
                if (ll - prev).abs() < config.tolerance {
                    converged = true;
                    final_ll = Some(ll);
                    break;
                }
            }
            let (initial, transition, emission) = maximization(&working, &stats)?;
            working.replace_parameters(initial, transition, emission);
            prev_ll = Some(ll);
            iterations += 1;

            #[cfg(feature = "tracing")]
            tracing::debug!(iteration = iterations, log_likelihood = ll, "em update");
        }

        let log_likelihood = match final_ll {
            Some(ll) => ll,
            None => total_log_likelihood(&working, sequences)?,
        };

        #[cfg(feature = "tracing")]
        tracing::info!(iterations, log_likelihood, converged, "training finished");

        *self = working;
        Ok(TrainReport {
            iterations,
            log_likelihood,
            converged,
        })
    }
}

fn total_log_likelihood<S: AsRef<[usize]>>(model: &HmmModel, sequences: &[S]) -> Result<f64> {
    let tables = model.log_tables();
    sequences.iter().try_fold(0.0, |acc, seq| {
        let (_, ll) = forward_pass(&tables, seq.as_ref());
        Ok(acc + check_log_likelihood(ll)?)
    })
}
