#![allow(dead_code)]

use hmm_engine::HmmModel;
use proptest::prelude::*;

pub const DEMO_OBS: [usize; 6] = [0, 0, 1, 0, 1, 1];

pub fn demo_model() -> HmmModel {
    HmmModel::from_rows(
        vec![0.5, 0.5],
        vec![vec![0.8, 0.3], vec![0.2, 0.7]],
        vec![vec![0.9, 0.1], vec![0.2, 0.8]],
    )
    .unwrap()
}

pub fn normalize(weights: &[f64]) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| w / sum).collect()
}

/// Build a valid model from `n + n*n + n*m` positive weights.
pub fn model_from_weights(n: usize, m: usize, weights: &[f64]) -> HmmModel {
    assert_eq!(weights.len(), n + n * n + n * m);
    let initial = normalize(&weights[..n]);
    let mut transition = vec![vec![0.0; n]; n];
    for from in 0..n {
        let start = n + from * n;
        let column = normalize(&weights[start..start + n]);
        for (to, p) in column.into_iter().enumerate() {
            transition[to][from] = p;
        }
    }
    let emission = (0..n)
        .map(|i| {
            let start = n + n * n + i * m;
            normalize(&weights[start..start + m])
        })
        .collect();
    HmmModel::from_rows(initial, transition, emission).unwrap()
}

pub fn arb_model(max_states: usize, max_symbols: usize) -> impl Strategy<Value = HmmModel> {
    (1..=max_states, 1..=max_symbols).prop_flat_map(|(n, m)| {
        prop::collection::vec(0.05f64..1.0, n + n * n + n * m)
            .prop_map(move |w| model_from_weights(n, m, &w))
    })
}

pub fn arb_model_and_obs(
    max_states: usize,
    max_symbols: usize,
    max_len: usize,
) -> impl Strategy<Value = (HmmModel, Vec<usize>)> {
    arb_model(max_states, max_symbols).prop_flat_map(move |model| {
        let m = model.n_symbols();
        (
            Just(model),
            prop::collection::vec(0..m, 1..=max_len),
        )
    })
}

/// Probability of one specific state path emitting `obs`.
pub fn path_probability(model: &HmmModel, path: &[usize], obs: &[usize]) -> f64 {
    let mut p = model.initial()[path[0]] * model.emission()[path[0]].probability(obs[0]);
    for t in 1..obs.len() {
        p *= model.transition()[path[t]][path[t - 1]]
            * model.emission()[path[t]].probability(obs[t]);
    }
    p
}

/// Enumerate all `n^T` paths: returns (total probability, best path probability).
pub fn brute_force(model: &HmmModel, obs: &[usize]) -> (f64, f64) {
    let n = model.n_states();
    let t_len = obs.len();
    let mut path = vec![0usize; t_len];
    let mut total = 0.0;
    let mut best = 0.0f64;
    loop {
        let p = path_probability(model, &path, obs);
        total += p;
        best = best.max(p);
        // odometer increment
        let mut pos = 0;
        loop {
            if pos == t_len {
                return (total, best);
            }
            path[pos] += 1;
            if path[pos] < n {
                break;
            }
            path[pos] = 0;
            pos += 1;
        }
    }
}

/// Plain probability-space Baum-Welch, no scaling; only for short sequences.
/// Returns `(initial, transition[to][from], emission[state][symbol])`.
pub fn reference_baum_welch(
    model: &HmmModel,
    sequences: &[Vec<usize>],
    iterations: usize,
) -> (Vec<f64>, Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let n = model.n_states();
    let m = model.n_symbols();
    let mut pi = model.initial().to_vec();
    let mut a = model.transition().to_vec();
    let mut b: Vec<Vec<f64>> = model
        .emission()
        .iter()
        .map(|d| d.probabilities().to_vec())
        .collect();

    for _ in 0..iterations {
        let mut pi_acc = vec![0.0; n];
        let mut a_num = vec![vec![0.0; n]; n];
        let mut a_den = vec![0.0; n];
        let mut b_num = vec![vec![0.0; m]; n];
        let mut b_den = vec![0.0; n];

        for obs in sequences {
            let t_len = obs.len();
            let mut alpha = vec![vec![0.0; n]; t_len];
            let mut beta = vec![vec![1.0; n]; t_len];
            for i in 0..n {
                alpha[0][i] = pi[i] * b[i][obs[0]];
            }
            for t in 1..t_len {
                for i in 0..n {
                    let s: f64 = (0..n).map(|j| a[i][j] * alpha[t - 1][j]).sum();
                    alpha[t][i] = b[i][obs[t]] * s;
                }
            }
            for t in (0..t_len - 1).rev() {
                for i in 0..n {
                    beta[t][i] = (0..n)
                        .map(|j| a[j][i] * b[j][obs[t + 1]] * beta[t + 1][j])
                        .sum();
                }
            }
            let p: f64 = alpha[t_len - 1].iter().sum();
            for t in 0..t_len {
                for i in 0..n {
                    let g = alpha[t][i] * beta[t][i] / p;
                    if t == 0 {
                        pi_acc[i] += g;
                    }
                    b_num[i][obs[t]] += g;
                    b_den[i] += g;
                    if t + 1 < t_len {
                        a_den[i] += g;
                    }
                }
            }
            for t in 0..t_len - 1 {
                for i in 0..n {
                    for j in 0..n {
                        a_num[i][j] +=
                            alpha[t][j] * a[i][j] * b[i][obs[t + 1]] * beta[t + 1][i] / p;
                    }
                }
            }
        }

        pi = pi_acc.iter().map(|g| g / sequences.len() as f64).collect();
        for j in 0..n {
            if a_den[j] > 0.0 {
                for i in 0..n {
                    a[i][j] = a_num[i][j] / a_den[j];
                }
            }
        }
        for i in 0..n {
            if b_den[i] > 0.0 {
                for s in 0..m {
                    b[i][s] = b_num[i][s] / b_den[i];
                }
            }
        }
    }
    (pi, a, b)
}

pub fn assert_params_close(
    model: &HmmModel,
    expected: &(Vec<f64>, Vec<Vec<f64>>, Vec<Vec<f64>>),
    tol: f64,
) {
    let (pi, a, b) = expected;
    for (got, want) in model.initial().iter().zip(pi) {
        assert!((got - want).abs() < tol, "initial {got} vs {want}");
    }
    for (row, want_row) in model.transition().iter().zip(a) {
        for (got, want) in row.iter().zip(want_row) {
            assert!((got - want).abs() < tol, "transition {got} vs {want}");
        }
    }
    for (dist, want_row) in model.emission().iter().zip(b) {
        for (got, want) in dist.probabilities().iter().zip(want_row) {
            assert!((got - want).abs() < tol, "emission {got} vs {want}");
        }
    }
}
